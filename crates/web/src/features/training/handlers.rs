use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use intelligence::generator::{DEFAULT_DURATION_WEEKS, GeneratePlanRequest, TrainingPlanDetail};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GeneratePlanBody {
    pub analysis_id: Uuid,
    /// Plan length in weeks. Defaults to 4 when omitted.
    #[validate(range(min = 1, max = 12))]
    pub duration_weeks: Option<u32>,
}

#[utoipa::path(
    post,
    path = "/api/training/plans",
    request_body = GeneratePlanBody,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Training plan generated", body = TrainingPlanDetail),
        (status = 400, description = "Plan already exists or analysis has no issues"),
        (status = 403, description = "Caller does not own the analysis"),
        (status = 404, description = "Analysis not found")
    ),
    tag = "training"
)]
pub async fn generate_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<GeneratePlanBody>,
) -> Result<Response, WebError> {
    body.validate()?;

    let request = GeneratePlanRequest {
        analysis_id: body.analysis_id,
        profile_id: user.profile_id,
        duration_weeks: body.duration_weeks.unwrap_or(DEFAULT_DURATION_WEEKS),
    };

    let plan = services::generate_plan(&state, request, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(plan)).into_response())
}
