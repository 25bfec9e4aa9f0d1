use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::{
    common::Paginated,
    ranking::{LeaderboardEntry, LeaderboardFilter, RecomputeSummary},
};

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rankings",
    params(LeaderboardFilter),
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = Paginated<LeaderboardEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "rankings"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(filter): Query<LeaderboardFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) = services::get_leaderboard(state.db.pool(), &filter).await?;

    let response = Paginated::of(entries, filter.page, filter.page_size, total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/rankings/recompute",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rankings recomputed", body = RecomputeSummary),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "rankings"
)]
pub async fn recompute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, WebError> {
    if !user.is_admin() {
        return Err(WebError::Forbidden("no tienes permiso".to_string()));
    }

    tracing::info!(admin = %user.profile_id, "admin triggered ranking recompute");

    let summary = services::recompute(state.db.pool(), Utc::now()).await?;

    Ok(Json(summary).into_response())
}
