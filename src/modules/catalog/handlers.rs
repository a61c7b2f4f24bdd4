use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::entities::catalog_item;
use super::repository::CatalogRepository;
use super::service::{CatalogService, ImportSummary};
use crate::shared::{error::AppResult, state::AppState};

const DEFAULT_PAGE_SIZE: u64 = 100;
const MAX_PAGE_SIZE: u64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Body is the raw CSV file.
pub async fn import_catalog(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ImportSummary>> {
    let repo = state.repo::<Arc<dyn CatalogRepository>>()?;
    let now = chrono::Utc::now().naive_utc();
    let summary = CatalogService::import(repo.as_ref(), &body, now).await?;
    Ok(Json(summary))
}

pub async fn list_catalog(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<catalog_item::Model>>> {
    let repo = state.repo::<Arc<dyn CatalogRepository>>()?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let items = repo
        .list(params.category.as_deref(), limit, params.offset.unwrap_or(0))
        .await?;
    Ok(Json(items))
}
