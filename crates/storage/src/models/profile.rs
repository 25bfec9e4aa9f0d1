use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Discrete skill bracket derived from the composite score thresholds.
/// Ordering follows promotion order so tier changes can be compared directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "skill_tier", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillTier {
    Unranked,
    Bronce,
    Plata,
    Oro,
    Platino,
    Diamante,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "profile_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileVisibility {
    Public,
    Friends,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Player,
    Organizer,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sport {
    pub sport_id: Uuid,
    pub slug: String,
    pub name: String,
    pub active: bool,
}

/// Sport-agnostic profile summary. Score fields are denormalized from the
/// player's best sport profile by the synchronizer; sport profiles remain the
/// source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlayerProfile {
    pub profile_id: Uuid,
    pub display_name: String,
    pub country: String,
    pub visibility: ProfileVisibility,
    pub composite_score: Option<f64>,
    pub effective_score: Option<f64>,
    pub skill_tier: SkillTier,
    pub global_rank: Option<i32>,
    pub country_rank: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SportProfile {
    pub sport_profile_id: Uuid,
    pub profile_id: Uuid,
    pub sport_id: Uuid,
    pub composite_score: Option<f64>,
    pub effective_score: Option<f64>,
    pub skill_tier: SkillTier,
    pub total_analyses: i32,
    pub total_techniques: i32,
    pub global_rank: Option<i32>,
    pub country_rank: Option<i32>,
    pub last_score_update: Option<DateTime<Utc>>,
}
