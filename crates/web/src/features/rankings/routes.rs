use axum::{Router, middleware, routing::get, routing::post};

use super::handlers::{get_leaderboard, recompute};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/recompute", post(recompute))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
