use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Library entry used as a fallback supplement during plan generation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExerciseTemplate {
    pub template_id: Uuid,
    pub sport_id: Option<Uuid>,
    pub name: String,
    pub instructions: String,
    pub default_sets: Option<i32>,
    pub default_reps: Option<i32>,
    pub default_duration_minutes: Option<i32>,
    pub target_areas: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TrainingPlan {
    pub plan_id: Uuid,
    pub analysis_id: Uuid,
    pub profile_id: Uuid,
    pub duration_weeks: i32,
    pub training_days_per_week: i32,
    pub difficulty: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Exercise {
    pub exercise_id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub instructions: String,
    pub day_number: i32,
    pub day_order: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub frequency: String,
}
