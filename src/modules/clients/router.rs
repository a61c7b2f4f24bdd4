use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::handlers;
use crate::shared::{middleware::require_manager, state::AppState};

/// Every client route is manager-only.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route("/:id", put(handlers::update_client))
        .route("/:id/cost", get(handlers::get_cost).put(handlers::put_cost))
        .route_layer(middleware::from_fn_with_state(state, require_manager))
}
