use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use super::handlers;
use crate::shared::{middleware::require_manager, state::AppState};

const IMPORT_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_catalog))
        .route(
            "/import",
            post(handlers::import_catalog).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state, require_manager))
}
