use axum::{Router, middleware, routing::post};

use super::handlers::generate_plan;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/plans", post(generate_plan))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
