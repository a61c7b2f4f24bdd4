use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::dtos::UpdateUserDto;
use super::entities::user;
use super::repository::UserRepository;
use super::service::UserService;
use crate::modules::auth::service::Claims;
use crate::modules::clients::repository::ClientRepository;
use crate::shared::{error::AppResult, state::AppState};

pub async fn get_me(
    State(state): State<AppState>,
    claims: Claims,
) -> AppResult<Json<user::Model>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    let user = UserService::get(user_repo.as_ref(), claims.id).await?;
    Ok(Json(user))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<user::Model>>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    Ok(Json(UserService::list(user_repo.as_ref()).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateUserDto>,
) -> AppResult<Json<user::Model>> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    let client_repo = state.repo::<Arc<dyn ClientRepository>>()?;

    let now = chrono::Utc::now().naive_utc();
    let user =
        UserService::update(user_repo.as_ref(), client_repo.as_ref(), id, dto, now).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let user_repo = state.repo::<Arc<dyn UserRepository>>()?;
    UserService::delete(user_repo.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
