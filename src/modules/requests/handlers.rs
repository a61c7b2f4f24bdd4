use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use super::dtos::{
    CreateRequestDto, DeliverDto, ExportParams, ImportReport, MatchesView, RequestView,
    UpdateRequestDto,
};
use super::entities::enums::RequestCategory;
use super::repository::RequestRepository;
use super::service::RequestService;
use crate::modules::auth::service::Claims;
use crate::modules::catalog::repository::CatalogRepository;
use crate::modules::matching::export::write_csv;
use crate::shared::error::{AppError, AppResult};
use crate::shared::identifier::generate_identifier;
use crate::shared::state::AppState;

fn service(state: &AppState) -> AppResult<RequestService<'_>> {
    let requests = state.repo::<Arc<dyn RequestRepository>>()?;
    let catalog = state.repo::<Arc<dyn CatalogRepository>>()?;
    Ok(RequestService::new(requests.as_ref(), catalog.as_ref()))
}

pub async fn list_own(
    State(state): State<AppState>,
    Path(category): Path<String>,
    claims: Claims,
) -> AppResult<Json<Vec<RequestView>>> {
    let category: RequestCategory = category.parse()?;
    let views = service(&state)?.list_for_user(claims.id, category).await?;
    Ok(Json(views))
}

pub async fn list_all(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<RequestView>>> {
    let category: RequestCategory = category.parse()?;
    Ok(Json(service(&state)?.list_all(category).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    claims: Claims,
) -> AppResult<Json<RequestView>> {
    let category: RequestCategory = category.parse()?;
    Ok(Json(service(&state)?.get(&claims, category, id).await?))
}

pub async fn create_request(
    State(state): State<AppState>,
    Path(category): Path<String>,
    claims: Claims,
    Json(dto): Json<CreateRequestDto>,
) -> AppResult<(StatusCode, Json<RequestView>)> {
    let category: RequestCategory = category.parse()?;
    let now = Utc::now().naive_utc();
    let view = service(&state)?
        .create(claims.id, category, dto, now, generate_identifier)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Body is the raw CSV file.
pub async fn import_requests(
    State(state): State<AppState>,
    Path(category): Path<String>,
    claims: Claims,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ImportReport>)> {
    let category: RequestCategory = category.parse()?;
    let now = Utc::now().naive_utc();
    let report = service(&state)?
        .import(claims.id, category, &body, now, generate_identifier)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn update_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    claims: Claims,
    Json(dto): Json<UpdateRequestDto>,
) -> AppResult<Json<RequestView>> {
    let category: RequestCategory = category.parse()?;
    let now = Utc::now().naive_utc();
    Ok(Json(
        service(&state)?
            .update(&claims, category, id, dto, now)
            .await?,
    ))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    claims: Claims,
) -> AppResult<Json<RequestView>> {
    let category: RequestCategory = category.parse()?;
    let now = Utc::now().naive_utc();
    Ok(Json(
        service(&state)?.cancel(&claims, category, id, now).await?,
    ))
}

pub async fn deliver_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    Json(dto): Json<DeliverDto>,
) -> AppResult<Json<RequestView>> {
    let category: RequestCategory = category.parse()?;
    let now = Utc::now().naive_utc();
    Ok(Json(service(&state)?.deliver(category, id, dto, now).await?))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    claims: Claims,
) -> AppResult<StatusCode> {
    let category: RequestCategory = category.parse()?;
    service(&state)?.delete(&claims, category, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_matches(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    claims: Claims,
) -> AppResult<Json<MatchesView>> {
    let category: RequestCategory = category.parse()?;
    Ok(Json(service(&state)?.matches(&claims, category, id).await?))
}

/// `?format=json` (default) or `?format=csv`.
pub async fn export_request(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    Query(params): Query<ExportParams>,
    claims: Claims,
) -> AppResult<Response> {
    let category: RequestCategory = category.parse()?;
    let as_csv = match params.format.as_deref() {
        None | Some("json") => false,
        Some("csv") => true,
        Some(other) => {
            return Err(AppError::validation(
                "format",
                format!("Unsupported export format `{}`", other),
            ));
        }
    };

    let now = Utc::now().naive_utc();
    let (request_id, rows) = service(&state)?
        .export(&claims, category, id, now)
        .await?;

    if !as_csv {
        return Ok(Json(rows).into_response());
    }

    let body = write_csv(&rows)
        .map_err(|e| AppError::InternalServerError(format!("CSV export failed: {}", e)))?;
    let disposition = format!("attachment; filename=\"{}.csv\"", request_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
