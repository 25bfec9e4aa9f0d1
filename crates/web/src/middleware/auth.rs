use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sqlx::FromRow;
use storage::models::UserRole;
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

/// Authenticated caller, resolved from the bearer token and attached as a
/// request extension.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct AuthUser {
    pub profile_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(WebError::Unauthorized)?;

    let user = sqlx::query_as::<_, AuthUser>(
        "SELECT profile_id, role FROM api_tokens WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(state.db.pool())
    .await
    .map_err(storage::error::StorageError::from)?
    .ok_or_else(|| {
        tracing::warn!("Invalid API token attempt");
        WebError::Unauthorized
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
