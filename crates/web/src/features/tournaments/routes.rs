use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use super::handlers::{get_bracket, register, report_result, start};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/bracket", patch(report_result))
        .route("/:id/register", post(register))
        .route("/:id/start", post(start))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/:id/bracket", get(get_bracket))
        .merge(protected)
}
