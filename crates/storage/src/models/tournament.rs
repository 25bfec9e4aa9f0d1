use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tournament_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    Registration,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "match_outcome", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tournament {
    pub tournament_id: Uuid,
    pub sport_id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
    pub max_players: i32,
    pub registration_end: DateTime<Utc>,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TournamentParticipant {
    pub participant_id: Uuid,
    pub tournament_id: Uuid,
    pub profile_id: Uuid,
    pub seed: i32,
    pub eliminated: bool,
    pub final_position: Option<i32>,
    pub registered_at: DateTime<Utc>,
}

/// One cell of the single-elimination tree, identified by (round, position).
/// Round r > 0 is fed by round r-1 winners at positions 2p and 2p+1.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BracketSlot {
    pub bracket_id: Uuid,
    pub tournament_id: Uuid,
    pub round: i32,
    pub position: i32,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
}

/// Explicit slot lifecycle instead of inferring it from which ids are null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotState {
    Empty,
    AwaitingOpponent,
    Ready,
    Decided,
}

impl BracketSlot {
    pub fn state(&self) -> SlotState {
        match (self.player1_id, self.player2_id, self.winner_id) {
            (_, _, Some(_)) => SlotState::Decided,
            (Some(_), Some(_), None) => SlotState::Ready,
            (None, None, None) => SlotState::Empty,
            _ => SlotState::AwaitingOpponent,
        }
    }

}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub bracket_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub score: Option<String>,
    pub player1_result: MatchOutcome,
    pub player2_result: MatchOutcome,
    pub player1_confirmed: bool,
    pub player2_confirmed: bool,
    pub played_at: DateTime<Utc>,
}
