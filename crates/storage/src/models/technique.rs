use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Technique {
    pub technique_id: Uuid,
    pub sport_id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreHistoryEntry {
    pub attempt: i32,
    pub score: f64,
    pub analysis_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Per-profile, per-technique rollup over the most recent completed analyses.
/// Fully recomputed on every completion for the (profile, technique) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TechniqueScore {
    pub technique_score_id: Uuid,
    pub sport_profile_id: Uuid,
    pub technique_id: Uuid,
    pub best_score: f64,
    pub average_score: f64,
    pub analysis_count: i32,
    pub last_analysis_id: Option<Uuid>,
    pub last_analysis_at: Option<DateTime<Utc>>,
    #[schema(value_type = Vec<ScoreHistoryEntry>)]
    pub score_history: sqlx::types::Json<Vec<ScoreHistoryEntry>>,
    pub updated_at: DateTime<Utc>,
}
