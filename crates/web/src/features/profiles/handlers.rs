use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::models::PlayerProfile;
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Player profile id")
    ),
    responses(
        (status = 200, description = "Player profile", body = PlayerProfile),
        (status = 404, description = "Profile not found or private")
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let profile = services::get_profile(state.db.pool(), profile_id).await?;

    Ok(Json(profile).into_response())
}
