use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use super::handlers;
use crate::shared::{middleware::require_manager, state::AppState};

const IMPORT_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    let managed = Router::new()
        .route("/:category/all", get(handlers::list_all))
        .route("/:category/:id/deliver", post(handlers::deliver_request))
        .route_layer(middleware::from_fn_with_state(state, require_manager));

    Router::new()
        .route(
            "/:category",
            get(handlers::list_own).post(handlers::create_request),
        )
        .route(
            "/:category/import",
            post(handlers::import_requests).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route(
            "/:category/:id",
            get(handlers::get_request)
                .put(handlers::update_request)
                .delete(handlers::delete_request),
        )
        .route("/:category/:id/cancel", post(handlers::cancel_request))
        .route("/:category/:id/matches", get(handlers::get_matches))
        .route("/:category/:id/export", get(handlers::export_request))
        .merge(managed)
}
