use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ranking_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingCategory {
    Global,
    Country,
}

/// Persisted ranking snapshot. Identity is the natural key
/// (sport_profile_id, category, period, country, period_start); recomputation
/// overwrites rank/score in place and carries the old rank into
/// `previous_rank`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ranking {
    pub ranking_id: Uuid,
    pub sport_profile_id: Uuid,
    pub category: RankingCategory,
    pub period: String,
    pub country: Option<String>,
    pub period_start: NaiveDate,
    pub rank: i32,
    pub previous_rank: Option<i32>,
    pub effective_score: f64,
    pub computed_at: DateTime<Utc>,
}
