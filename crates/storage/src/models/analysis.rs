use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "analysis_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "issue_severity", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    /// Weight used for issue prioritization and plan difficulty.
    pub fn weight(&self) -> i32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// One completed video assessment of a technique. Read-only input to the
/// scoring pipeline; `overall_score` is on the analyzer's 0-10 scale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Analysis {
    pub analysis_id: Uuid,
    pub profile_id: Uuid,
    pub technique_id: Uuid,
    pub status: AnalysisStatus,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AnalysisIssue {
    pub issue_id: Uuid,
    pub analysis_id: Uuid,
    pub severity: IssueSeverity,
    pub category: String,
    pub description: String,
    pub correction: String,
    #[schema(value_type = Vec<String>)]
    pub drill_suggestions: sqlx::types::Json<Vec<String>>,
}
