use axum::{extract::Request, middleware::Next, response::Response};

use crate::modules::auth::service::Claims;
use crate::shared::error::{AppError, AppResult};

/// Rejects callers whose token carries role 0.
pub async fn require_manager(claims: Claims, request: Request, next: Next) -> AppResult<Response> {
    if !claims.is_manager() {
        tracing::debug!("User {} denied manager route {}", claims.id, request.uri());
        return Err(AppError::Forbidden("Manager role required".to_string()));
    }

    Ok(next.run(request).await)
}
