pub mod bracket;
pub mod rankings;
pub mod skill_score;
