use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbError(#[from] sea_orm::DbErr),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Not found")]
    NotFound,

    #[error("Duplicate identifier")]
    DuplicateIdentifier,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Malformed selection: {0}")]
    MalformedSelection(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::DbError(_) => "UPSTREAM_FAILURE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InvalidCategory(_) => "INVALID_CATEGORY",
            AppError::MalformedSelection(_) => "MALFORMED_SELECTION",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message, details) = match self {
            AppError::DbError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    vec![],
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                errors,
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string(), vec![]),
            AppError::DuplicateIdentifier => (
                StatusCode::CONFLICT,
                "Identifier collision, please retry".to_string(),
                vec![],
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, vec![]),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, vec![]),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "Token expired".to_string(),
                vec![],
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, vec![]),
            AppError::InvalidCategory(category) => (
                StatusCode::BAD_REQUEST,
                format!("Unknown request category: {}", category),
                vec![],
            ),
            AppError::MalformedSelection(msg) => (StatusCode::BAD_REQUEST, msg, vec![]),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    vec![],
                )
            }
        };

        (
            status,
            Json(json!({
                "error": message,
                "error_code": status.as_u16(),
                "code": code,
                "details": details,
            })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::validation("email", "required"), StatusCode::BAD_REQUEST),
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::DuplicateIdentifier, StatusCode::CONFLICT),
            (AppError::TokenExpired, StatusCode::UNAUTHORIZED),
            (
                AppError::InvalidCategory("purple".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Forbidden("manager only".to_string()),
                StatusCode::FORBIDDEN,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
