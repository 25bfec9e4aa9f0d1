pub mod analysis;
pub mod common;
pub mod ranking;
pub mod tournament;
