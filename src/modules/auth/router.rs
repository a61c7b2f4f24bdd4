use axum::{Router, routing::post};

use super::handlers;
use crate::shared::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/password-reset-request", post(handlers::password_reset_request))
        .route("/reset-password", post(handlers::reset_password))
}
