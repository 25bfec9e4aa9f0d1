pub mod analysis;
pub mod profile;
pub mod ranking;
pub mod technique_score;
pub mod tournament;
pub mod training;
