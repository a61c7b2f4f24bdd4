use chrono::NaiveDateTime;
use std::collections::HashSet;

use super::domain::request::{CompleteState, NewRequest, RequestDomain};
use super::dtos::{
    CreateRequestDto, DeliverDto, ImportReport, MatchesView, RequestView, UpdateRequestDto,
};
use super::entities::{enums::RequestCategory, request};
use super::import::{at_line, parse_request_csv};
use super::repository::RequestRepository;
use crate::modules::auth::service::Claims;
use crate::modules::catalog::entities::catalog_item;
use crate::modules::catalog::repository::CatalogRepository;
use crate::modules::matching::engine::referenced_categories;
use crate::modules::matching::export::export_rows;
use crate::modules::matching::{ExportRow, Selection, evaluate};
use crate::shared::error::{AppError, AppResult};
use crate::shared::identifier::with_identifier_retry;

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Request lifecycle over one repository pair. Red requests are evaluated
/// against a catalog snapshot taken per call.
pub struct RequestService<'a> {
    requests: &'a dyn RequestRepository,
    catalog: &'a dyn CatalogRepository,
}

impl<'a> RequestService<'a> {
    pub fn new(requests: &'a dyn RequestRepository, catalog: &'a dyn CatalogRepository) -> Self {
        Self { requests, catalog }
    }

    pub async fn create(
        &self,
        user_id: i32,
        category: RequestCategory,
        dto: CreateRequestDto,
        now: NaiveDateTime,
        next_id: impl FnMut() -> String,
    ) -> AppResult<RequestView> {
        let new = dto.into_new_request(category)?;
        let catalog = self.snapshot(categories_of(new.detail.work_selection())).await?;
        let request = self.insert_new(user_id, new, &catalog, now, next_id).await?;

        tracing::info!("Created {} request {}", category, request.request_id);
        Ok(Self::view(request, &catalog))
    }

    /// Every row is validated before anything is written; rows are then
    /// inserted in file order, each as a new request.
    pub async fn import(
        &self,
        user_id: i32,
        category: RequestCategory,
        bytes: &[u8],
        now: NaiveDateTime,
        mut next_id: impl FnMut() -> String,
    ) -> AppResult<ImportReport> {
        let rows = parse_request_csv(bytes)?;

        let mut prepared = Vec::with_capacity(rows.len());
        for (index, dto) in rows.into_iter().enumerate() {
            let new = dto
                .into_new_request(category)
                .map_err(|e| at_line(e, index + 2))?;
            prepared.push(new);
        }

        let categories = prepared
            .iter()
            .flat_map(|new| categories_of(new.detail.work_selection()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let catalog = self.snapshot(categories).await?;

        let imported = prepared.len();
        for new in prepared {
            self.insert_new(user_id, new, &catalog, now, &mut next_id)
                .await?;
        }

        tracing::info!(
            "Imported {} {} requests for user {}",
            imported,
            category,
            user_id
        );
        Ok(ImportReport { imported })
    }

    async fn insert_new(
        &self,
        user_id: i32,
        new: NewRequest,
        catalog: &[catalog_item::Model],
        now: NaiveDateTime,
        next_id: impl FnMut() -> String,
    ) -> AppResult<RequestDomain> {
        let mut request = RequestDomain::create(user_id, new, String::new(), now);
        let matched = request
            .work_selection()
            .map(|work| evaluate(&request.area_selection, work, catalog, now).matched_count);
        if let Some(matched) = matched {
            request.list_count = Some(count(matched));
        }

        let base = request.into_model();
        let saved = with_identifier_retry(next_id, |request_id| {
            self.requests.insert(request::Model {
                request_id,
                ..base.clone()
            })
        })
        .await?;

        RequestDomain::try_from(saved)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        category: RequestCategory,
    ) -> AppResult<Vec<RequestView>> {
        let rows = self.requests.find_by_user(user_id, category).await?;
        self.views(rows).await
    }

    pub async fn list_all(&self, category: RequestCategory) -> AppResult<Vec<RequestView>> {
        let rows = self.requests.find_by_category(category).await?;
        self.views(rows).await
    }

    pub async fn get(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
    ) -> AppResult<RequestView> {
        let request = self.load(caller, category, id).await?;
        self.single_view(request).await
    }

    pub async fn update(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
        dto: UpdateRequestDto,
        now: NaiveDateTime,
    ) -> AppResult<RequestView> {
        let changes = dto.into_changes()?;
        let mut request = self.load(caller, category, id).await?;
        request.apply_update(changes, now);

        let saved = self.save(request).await?;
        self.single_view(saved).await
    }

    pub async fn cancel(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
        now: NaiveDateTime,
    ) -> AppResult<RequestView> {
        let mut request = self.load(caller, category, id).await?;
        request.cancel(now);

        let saved = self.save(request).await?;
        tracing::info!("Cancelled {} request {}", category, saved.request_id);
        self.single_view(saved).await
    }

    /// Manager-only; the router enforces the role.
    pub async fn deliver(
        &self,
        category: RequestCategory,
        id: i32,
        dto: DeliverDto,
        now: NaiveDateTime,
    ) -> AppResult<RequestView> {
        let file = dto.into_file()?;
        let mut request = self.find(category, id).await?;
        request.deliver(file, now);

        let saved = self.save(request).await?;
        tracing::info!("Delivered file for {} request {}", category, saved.request_id);
        self.single_view(saved).await
    }

    pub async fn delete(&self, caller: &Claims, category: RequestCategory, id: i32) -> AppResult<()> {
        let request = self.load(caller, category, id).await?;
        if !self.requests.delete(request.id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!("Deleted {} request {}", category, request.request_id);
        Ok(())
    }

    pub async fn matches(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
    ) -> AppResult<MatchesView> {
        let request = self.load_red(caller, category, id).await?;
        let work = request.work_selection().ok_or_else(Self::not_matchable)?;
        let catalog = self.snapshot(referenced_categories(work)).await?;

        let evaluation = evaluate(&request.area_selection, work, &catalog, request.created_at);
        Ok(MatchesView {
            request_id: request.request_id.clone(),
            matched_count: evaluation.matched_count,
            results: evaluation.results,
        })
    }

    /// Rows to download, and the stored `listCount` is refreshed to the
    /// current number of registered pairs.
    pub async fn export(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
        now: NaiveDateTime,
    ) -> AppResult<(String, Vec<ExportRow>)> {
        let mut request = self.load_red(caller, category, id).await?;
        let work = request.work_selection().ok_or_else(Self::not_matchable)?;
        let catalog = self.snapshot(referenced_categories(work)).await?;

        let rows = export_rows(&request.area_selection, work, &catalog);
        let matched = evaluate(&request.area_selection, work, &catalog, request.created_at)
            .matched_count;

        request.list_count = Some(count(matched));
        request.updated_at = now;
        let saved = self.save(request).await?;

        Ok((saved.request_id, rows))
    }

    async fn find(&self, category: RequestCategory, id: i32) -> AppResult<RequestDomain> {
        let model = self
            .requests
            .find_by_id(id)
            .await?
            .filter(|model| model.category == category)
            .ok_or(AppError::NotFound)?;
        RequestDomain::try_from(model)
    }

    /// Owner or manager only.
    async fn load(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
    ) -> AppResult<RequestDomain> {
        let request = self.find(category, id).await?;
        if request.user_id != caller.id && !caller.is_manager() {
            return Err(AppError::Forbidden(
                "This request belongs to another user".to_string(),
            ));
        }
        Ok(request)
    }

    async fn load_red(
        &self,
        caller: &Claims,
        category: RequestCategory,
        id: i32,
    ) -> AppResult<RequestDomain> {
        if category != RequestCategory::Red {
            return Err(Self::not_matchable());
        }
        self.load(caller, category, id).await
    }

    fn not_matchable() -> AppError {
        AppError::validation(
            "category",
            "Only red requests are matched against the catalog.",
        )
    }

    async fn save(&self, request: RequestDomain) -> AppResult<RequestDomain> {
        let saved = self.requests.update(request.into_model()).await?;
        RequestDomain::try_from(saved)
    }

    async fn snapshot(&self, categories: Vec<String>) -> AppResult<Vec<catalog_item::Model>> {
        if categories.is_empty() {
            return Ok(vec![]);
        }
        self.catalog.find_by_categories(&categories).await
    }

    async fn single_view(&self, request: RequestDomain) -> AppResult<RequestView> {
        let catalog = self.snapshot(referenced(&request)).await?;
        Ok(Self::view(request, &catalog))
    }

    async fn views(&self, rows: Vec<request::Model>) -> AppResult<Vec<RequestView>> {
        let requests = rows
            .into_iter()
            .map(RequestDomain::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let categories = requests
            .iter()
            .flat_map(referenced)
            .filter(|c| seen.insert(c.clone()))
            .collect();
        let catalog = self.snapshot(categories).await?;

        Ok(requests
            .into_iter()
            .map(|request| Self::view(request, &catalog))
            .collect())
    }

    /// Applies the read-time derivation: an active red request with at least
    /// one registered pair reads as Fulfilled with `listCount` set to the
    /// number of registered pairs. Nothing is written back.
    fn view(mut request: RequestDomain, catalog: &[catalog_item::Model]) -> RequestView {
        let evaluation = match request.work_selection() {
            Some(work) if !request.cancelled => Some(evaluate(
                &request.area_selection,
                work,
                catalog,
                request.created_at,
            )),
            _ => None,
        };

        let matched_count = evaluation.map(|evaluation| {
            if evaluation.has_match() {
                request.complete_state = CompleteState::Fulfilled;
                request.list_count = Some(count(evaluation.matched_count));
            }
            evaluation.matched_count
        });

        RequestView::from_domain(request, matched_count)
    }
}

/// Catalog categories an active red request needs to be evaluated.
fn referenced(request: &RequestDomain) -> Vec<String> {
    match request.work_selection() {
        Some(work) if !request.cancelled => referenced_categories(work),
        _ => vec![],
    }
}

fn categories_of(work: Option<&Selection>) -> Vec<String> {
    work.map(referenced_categories).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::infra::persistence::InMemoryCatalogRepository;
    use crate::modules::catalog::repository::UpsertOutcome;
    use crate::modules::requests::infra::persistence::InMemoryRequestRepository;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn caller(id: i32, role: i32) -> Claims {
        Claims {
            id,
            role,
            iat: 0,
            exp: usize::MAX,
        }
    }

    fn ids(list: &[&str]) -> impl FnMut() -> String {
        let mut queue: Vec<String> = list.iter().rev().map(|s| s.to_string()).collect();
        move || queue.pop().unwrap_or_else(|| "zzzzz".to_string())
    }

    fn red_dto() -> CreateRequestDto {
        CreateRequestDto {
            project_name: "渋谷IT".to_string(),
            wish_num: 10,
            area_selection: Some(json!({"region1": ["東京都渋谷区"]})),
            work_selection: Some(json!({"catA": ["IT・情報通信"]})),
            ..Default::default()
        }
    }

    async fn add_item(catalog: &InMemoryCatalogRepository, url: &str, address: &str) {
        let outcome = catalog
            .upsert_by_url(catalog_item::Model {
                id: 0,
                company: "株式会社テスト".to_string(),
                postal_code: "150-0001".to_string(),
                address: address.to_string(),
                phone: "03-0000-0000".to_string(),
                fax: String::new(),
                url: url.to_string(),
                category: "IT・情報通信".to_string(),
                created_at: at(1),
                updated_at: at(2),
            })
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_red_read_derives_fulfilled_from_catalog() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);

        let created = service
            .create(1, RequestCategory::Red, red_dto(), at(5), ids(&["aaaaa"]))
            .await
            .unwrap();
        assert_eq!(created.complete_state, CompleteState::Pending);
        assert_eq!(created.list_count, Some(0));

        add_item(&catalog, "https://a.example", "東京都渋谷区1-2-3").await;

        let listed = service.list_for_user(1, RequestCategory::Red).await.unwrap();
        assert_eq!(listed[0].complete_state, CompleteState::Fulfilled);
        assert_eq!(listed[0].list_count, Some(1));
        assert_eq!(listed[0].matched_count, Some(1));

        // derivation is not written back
        let stored = requests.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.complete_state, 0);
        assert_eq!(stored.list_count, Some(0));
    }

    #[tokio::test]
    async fn test_red_read_without_overlap_keeps_stored_state() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        add_item(&catalog, "https://osaka.example", "大阪府大阪市").await;
        let service = RequestService::new(&requests, &catalog);

        let dto = CreateRequestDto {
            complete_state: Some(1),
            ..red_dto()
        };
        let created = service
            .create(1, RequestCategory::Red, dto, at(5), ids(&["aaaaa"]))
            .await
            .unwrap();

        let view = service.get(&caller(1, 0), RequestCategory::Red, created.id).await.unwrap();
        assert_eq!(view.complete_state, CompleteState::Requested);
        assert_eq!(view.matched_count, Some(0));
    }

    #[tokio::test]
    async fn test_cancelled_red_request_is_not_derived() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        add_item(&catalog, "https://a.example", "東京都渋谷区1-2-3").await;
        let service = RequestService::new(&requests, &catalog);
        let created = service
            .create(1, RequestCategory::Red, red_dto(), at(5), ids(&["aaaaa"]))
            .await
            .unwrap();
        assert_eq!(created.complete_state, CompleteState::Fulfilled);
        assert_eq!(created.list_count, Some(1));

        let cancelled = service
            .cancel(&caller(1, 0), RequestCategory::Red, created.id, at(6))
            .await
            .unwrap();
        assert_eq!(cancelled.cancel_state, 1);
        assert_eq!(cancelled.complete_state, CompleteState::Pending);
        assert_eq!(cancelled.request_at, None);
    }

    #[tokio::test]
    async fn test_create_retries_request_id_collision() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let dto = CreateRequestDto {
            project_name: "green".to_string(),
            area_selection: Some(json!({})),
            ..Default::default()
        };

        service
            .create(1, RequestCategory::Green, dto.clone(), at(5), ids(&["aaaaa"]))
            .await
            .unwrap();
        let second = service
            .create(1, RequestCategory::Green, dto.clone(), at(5), ids(&["aaaaa", "bbbbb"]))
            .await
            .unwrap();
        assert_eq!(second.request_id, "bbbbb");

        let err = service
            .create(1, RequestCategory::Green, dto, at(5), ids(&["aaaaa", "bbbbb"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier));
    }

    #[tokio::test]
    async fn test_other_users_request_is_forbidden_except_for_managers() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let created = service
            .create(1, RequestCategory::Red, red_dto(), at(5), ids(&["aaaaa"]))
            .await
            .unwrap();

        let err = service
            .get(&caller(2, 0), RequestCategory::Red, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(service.get(&caller(2, 1), RequestCategory::Red, created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_category_path_is_not_found() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let created = service
            .create(1, RequestCategory::Red, red_dto(), at(5), ids(&["aaaaa"]))
            .await
            .unwrap();

        let err = service
            .get(&caller(1, 0), RequestCategory::Pink, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_deliver_then_delete() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let dto = CreateRequestDto {
            project_name: "ポータル".to_string(),
            area_selection: Some(json!({})),
            portal_site: Some("SUUMO".to_string()),
            ..Default::default()
        };
        let created = service
            .create(1, RequestCategory::Yellow, dto, at(5), ids(&["aaaaa"]))
            .await
            .unwrap();

        let delivered = service
            .deliver(
                RequestCategory::Yellow,
                created.id,
                DeliverDto {
                    file_path: "/files/aaaaa.csv".to_string(),
                    file_name: "aaaaa.csv".to_string(),
                    row_count: 120,
                },
                at(7),
            )
            .await
            .unwrap();
        assert_eq!(delivered.complete_state, CompleteState::Fulfilled);
        assert_eq!(delivered.delivery_at, Some(at(7)));
        assert_eq!(delivered.row_count, Some(120));
        assert_eq!(delivered.portal_site.as_deref(), Some("SUUMO"));

        service
            .delete(&caller(1, 0), RequestCategory::Yellow, created.id)
            .await
            .unwrap();
        assert!(requests.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_matches_and_export() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        add_item(&catalog, "https://a.example", "東京都渋谷区1-2-3").await;
        add_item(&catalog, "https://b.example", "東京都渋谷区道玄坂").await;
        let service = RequestService::new(&requests, &catalog);
        let dto = CreateRequestDto {
            area_selection: Some(json!({"r": ["東京都渋谷区", "北海道"]})),
            ..red_dto()
        };
        let created = service
            .create(1, RequestCategory::Red, dto, at(5), ids(&["aaaaa"]))
            .await
            .unwrap();

        let matches = service
            .matches(&caller(1, 0), RequestCategory::Red, created.id)
            .await
            .unwrap();
        assert_eq!(matches.matched_count, 1);
        assert_eq!(matches.results.len(), 2);
        assert_eq!(matches.results[1].area, "北海道");

        let (request_id, rows) = service
            .export(&caller(1, 0), RequestCategory::Red, created.id, at(9))
            .await
            .unwrap();
        assert_eq!(request_id, "aaaaa");
        let urls: Vec<_> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);

        let stored = requests.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.list_count, Some(1));
        assert_eq!(stored.updated_at, at(9));
    }

    #[tokio::test]
    async fn test_matches_follow_submitted_group_order_after_save() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let dto = CreateRequestDto {
            area_selection: Some(json!({"region2": ["大阪府"], "region1": ["東京都"]})),
            work_selection: Some(json!({"飲食店": ["カフェ"], "IT": ["SaaS"]})),
            ..red_dto()
        };
        let created = service
            .create(1, RequestCategory::Red, dto, at(5), ids(&["ord02"]))
            .await
            .unwrap();

        let stored = requests.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(
            stored.area_selection,
            json!([["region2", ["大阪府"]], ["region1", ["東京都"]]])
        );

        let matches = service
            .matches(&caller(1, 0), RequestCategory::Red, created.id)
            .await
            .unwrap();
        let order: Vec<_> = matches
            .results
            .iter()
            .map(|r| (r.area.as_str(), r.small_category.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("大阪府", "カフェ"),
                ("大阪府", "SaaS"),
                ("東京都", "カフェ"),
                ("東京都", "SaaS"),
            ]
        );
    }

    #[tokio::test]
    async fn test_matches_reject_non_red() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);

        let err = service
            .matches(&caller(1, 0), RequestCategory::Blue, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_import_validates_every_row_first() {
        let requests = InMemoryRequestRepository::new();
        let catalog = InMemoryCatalogRepository::new();
        let service = RequestService::new(&requests, &catalog);
        let csv = "projectName,areaSelection\nfirst,\"{}\"\n,\"{}\"\n";

        let err = service
            .import(1, RequestCategory::Pink, csv.as_bytes(), at(5), ids(&["aaaaa", "bbbbb"]))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors[0].field, "line 3: projectName"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(requests.find_by_user(1, RequestCategory::Pink).await.unwrap().is_empty());

        let csv = "projectName,areaSelection\nfirst,\"{}\"\nsecond,\"{}\"\n";
        let report = service
            .import(1, RequestCategory::Pink, csv.as_bytes(), at(5), ids(&["aaaaa", "bbbbb"]))
            .await
            .unwrap();
        assert_eq!(report.imported, 2);
    }
}
