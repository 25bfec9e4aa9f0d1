use axum::{Router, middleware, routing::post};

use super::handlers::complete_analysis;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:id/complete", post(complete_analysis))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
