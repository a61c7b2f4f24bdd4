use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::dtos::{CostDto, CreateClientDto, UpdateClientDto};
use super::entities::{client, client_cost};
use super::repository::ClientRepository;
use super::service::ClientService;
use crate::shared::identifier::generate_identifier;
use crate::shared::{error::AppResult, state::AppState};

pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<Vec<client::Model>>> {
    let repo = state.repo::<Arc<dyn ClientRepository>>()?;
    Ok(Json(ClientService::list(repo.as_ref()).await?))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(dto): Json<CreateClientDto>,
) -> AppResult<(StatusCode, Json<client::Model>)> {
    let repo = state.repo::<Arc<dyn ClientRepository>>()?;
    let now = chrono::Utc::now().naive_utc();

    let client = ClientService::add_client(
        state.repo_manager.as_ref(),
        repo.as_ref(),
        &dto.name,
        now,
        generate_identifier,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateClientDto>,
) -> AppResult<Json<client::Model>> {
    let repo = state.repo::<Arc<dyn ClientRepository>>()?;
    let now = chrono::Utc::now().naive_utc();
    Ok(Json(ClientService::update(repo.as_ref(), id, dto, now).await?))
}

pub async fn get_cost(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<client_cost::Model>> {
    let repo = state.repo::<Arc<dyn ClientRepository>>()?;
    let now = chrono::Utc::now().naive_utc();
    Ok(Json(ClientService::get_cost(repo.as_ref(), id, now).await?))
}

pub async fn put_cost(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(dto): Json<CostDto>,
) -> AppResult<Json<client_cost::Model>> {
    let repo = state.repo::<Arc<dyn ClientRepository>>()?;
    let now = chrono::Utc::now().naive_utc();
    Ok(Json(ClientService::set_cost(repo.as_ref(), id, dto, now).await?))
}
