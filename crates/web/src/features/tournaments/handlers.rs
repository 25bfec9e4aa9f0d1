use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::tournament::{BracketResponse, ReportResultRequest};
use storage::models::{BracketSlot, TournamentParticipant};
use uuid::Uuid;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/bracket",
    params(
        ("id" = Uuid, Path, description = "Tournament id")
    ),
    responses(
        (status = 200, description = "Bracket snapshot", body = BracketResponse),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let bracket = services::get_bracket(state.db.pool(), tournament_id).await?;

    Ok(Json(bracket).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/tournaments/{id}/bracket",
    params(
        ("id" = Uuid, Path, description = "Tournament id")
    ),
    request_body = ReportResultRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result recorded and bracket advanced", body = BracketSlot),
        (status = 400, description = "Invalid state or winner"),
        (status = 403, description = "Caller is not the organizer or an admin"),
        (status = 404, description = "Tournament or bracket not found")
    ),
    tag = "tournaments"
)]
pub async fn report_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<Uuid>,
    Json(req): Json<ReportResultRequest>,
) -> Result<Response, WebError> {
    let tournament = services::find_tournament(state.db.pool(), tournament_id).await?;

    if !user.is_admin() && tournament.organizer_id != user.profile_id {
        return Err(WebError::Forbidden("no tienes permiso".to_string()));
    }

    let slot = services::report_result(
        state.db.pool(),
        &tournament,
        req.bracket_id,
        req.winner_id,
        req.score,
        Utc::now(),
    )
    .await?;

    Ok(Json(slot).into_response())
}

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/register",
    params(
        ("id" = Uuid, Path, description = "Tournament id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Registered", body = TournamentParticipant),
        (status = 400, description = "Already registered, full, or registration closed"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let participant =
        services::register(state.db.pool(), tournament_id, user.profile_id, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(participant)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Tournament id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bracket created, tournament in progress", body = Vec<BracketSlot>),
        (status = 400, description = "Wrong state or participant count"),
        (status = 403, description = "Caller is not the organizer or an admin"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn start(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let tournament = services::find_tournament(state.db.pool(), tournament_id).await?;

    if !user.is_admin() && tournament.organizer_id != user.profile_id {
        return Err(WebError::Forbidden("no tienes permiso".to_string()));
    }

    let slots = services::start(state.db.pool(), tournament_id).await?;

    Ok(Json(slots).into_response())
}
