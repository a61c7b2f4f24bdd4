use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use super::dtos::{PasswordResetRequestDto, ResetPasswordDto, SigninDto, SignupDto};
use super::service::AuthService;
use crate::modules::clients::repository::ClientRepository;
use crate::modules::users::repository::UserRepository;
use crate::shared::{error::AppResult, state::AppState};

pub async fn signup(
    State(state): State<AppState>,
    Json(dto): Json<SignupDto>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    let client_repo = state.repo::<Arc<dyn ClientRepository>>()?;

    let token = AuthService::signup(
        user_repo.as_ref(),
        client_repo.as_ref(),
        &state.config,
        dto,
        Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully.",
            "token": token,
        })),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(dto): Json<SigninDto>,
) -> AppResult<Json<Value>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    let token = AuthService::signin(user_repo.as_ref(), &state.config, dto, Utc::now()).await?;

    Ok(Json(json!({
        "token": token,
        "token_type": "Bearer",
    })))
}

pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(dto): Json<PasswordResetRequestDto>,
) -> AppResult<Json<Value>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    AuthService::request_password_reset(
        user_repo.as_ref(),
        state.email_provider.as_ref(),
        &state.config,
        &dto.email,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({ "message": "Password reset e-mail sent." })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(dto): Json<ResetPasswordDto>,
) -> AppResult<Json<Value>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    AuthService::reset_password(user_repo.as_ref(), &state.config, dto, Utc::now()).await?;

    Ok(Json(json!({ "message": "Password has been reset." })))
}
