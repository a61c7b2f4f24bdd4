use axum::{Router, routing::get};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::modules::{auth, catalog, clients, requests, users};
use crate::shared::handlers::{handler_404, handler_500};
use crate::shared::state::AppState;

pub fn init_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::router::router())
        .nest("/users", users::router::router(state.clone()))
        .nest("/clients", clients::router::router(state.clone()))
        .nest("/catalog", catalog::router::router(state.clone()))
        .nest("/requests", requests::router::router(state.clone()));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .fallback(handler_404)
        .layer(CatchPanicLayer::custom(handler_500))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
