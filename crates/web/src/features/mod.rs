pub mod analyses;
pub mod profiles;
pub mod rankings;
pub mod tournaments;
pub mod training;
