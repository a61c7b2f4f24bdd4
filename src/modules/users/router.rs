use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::handlers;
use crate::shared::{middleware::require_manager, state::AppState};

pub fn router(state: AppState) -> Router<AppState> {
    let managed = Router::new()
        .route("/", get(handlers::list_users))
        .route("/:id", put(handlers::update_user).delete(handlers::delete_user))
        .route_layer(middleware::from_fn_with_state(state, require_manager));

    Router::new()
        .route("/me", get(handlers::get_me))
        .merge(managed)
}
