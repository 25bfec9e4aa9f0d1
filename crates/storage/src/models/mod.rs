mod analysis;
mod profile;
mod ranking;
mod technique;
mod tournament;
mod training;

pub use analysis::{Analysis, AnalysisIssue, AnalysisStatus, IssueSeverity};
pub use profile::{PlayerProfile, ProfileVisibility, SkillTier, Sport, SportProfile, UserRole};
pub use ranking::{Ranking, RankingCategory};
pub use technique::{ScoreHistoryEntry, Technique, TechniqueScore};
pub use tournament::{
    BracketSlot, MatchOutcome, MatchRecord, SlotState, Tournament, TournamentParticipant,
    TournamentStatus,
};
pub use training::{Exercise, ExerciseTemplate, TrainingPlan};
