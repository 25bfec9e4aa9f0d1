use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::analysis::CompleteAnalysisRequest;
use storage::models::Analysis;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/analyses/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Analysis id")
    ),
    request_body = CompleteAnalysisRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Analysis completed and scores recalculated", body = Analysis),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the analysis"),
        (status = 404, description = "Analysis not found")
    ),
    tag = "analyses"
)]
pub async fn complete_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(analysis_id): Path<Uuid>,
    Json(req): Json<CompleteAnalysisRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let analysis = services::find_analysis(state.db.pool(), analysis_id).await?;

    if !user.is_admin() && analysis.profile_id != user.profile_id {
        return Err(WebError::Forbidden("no tienes permiso".to_string()));
    }

    let issues = req.issues.into_iter().map(Into::into).collect();

    let analysis = services::complete_analysis(
        state.db.pool(),
        analysis_id,
        req.overall_score,
        issues,
        Utc::now(),
    )
    .await?;

    Ok(Json(analysis).into_response())
}
