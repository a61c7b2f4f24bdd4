use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::service::{AuthService, Claims};
use crate::shared::error::AppError;
use crate::shared::state::AppState;

#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized(
                "Missing Authorization header".to_string(),
            ))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

        AuthService::verify_token(&state.config, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::providers::email::SmtpMailer;
    use crate::modules::users::entities::user;
    use crate::shared::config::test_config;
    use crate::shared::infra::repository::InMemoryRepositoryManager;
    use axum::http::Request;
    use chrono::Utc;
    use std::sync::Arc;

    fn state() -> AppState {
        let config = test_config();
        AppState {
            email_provider: Arc::new(SmtpMailer::new(&config).unwrap()),
            repo_manager: Arc::new(InMemoryRepositoryManager::new()),
            config: Arc::new(config),
        }
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_bearer_token_is_decoded() {
        let state = state();
        let now = Utc::now();
        let user = user::Model {
            id: 9,
            name: "Manager".to_string(),
            email: "m@example.com".to_string(),
            password: String::new(),
            role: 1,
            contract_id: None,
            password_reset_token: None,
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
        };
        let token = AuthService::issue_token(&state.config, &user, now).unwrap();

        let mut parts = parts(Some(&format!("Bearer {}", token)));
        let claims = Claims::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(claims.id, 9);
        assert!(claims.is_manager());
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_unauthorized() {
        let state = state();
        for header in [None, Some("Token abc"), Some("Bearer not.a.jwt")] {
            let mut parts = parts(header);
            let result = Claims::from_request_parts(&mut parts, &state).await;
            assert!(matches!(result, Err(AppError::Unauthorized(_))));
        }
    }
}
