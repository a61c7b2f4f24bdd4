use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::requests::entities::{enums::RequestCategory, request};
use crate::modules::requests::repository::RequestRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::{
    SeaOrmRepository, not_updated_as_not_found, unique_violation_as,
};
use crate::shared::repository::UnitOfWork;
use crate::{impl_sea_orm_repo, with_conn};

// =========================================================================
// Postgres Implementation
// =========================================================================

pub type PostgresRequestRepository = SeaOrmRepository<request::Entity>;

impl_sea_orm_repo!(PostgresRequestRepository, RequestRepository, {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<request::Model>> {
        with_conn!(&self.conn, |db| request::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::DbError))
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        category: RequestCategory,
    ) -> AppResult<Vec<request::Model>> {
        let query = request::Entity::find()
            .filter(request::Column::UserId.eq(user_id))
            .filter(request::Column::Category.eq(category))
            .order_by_desc(request::Column::CreatedAt)
            .order_by_desc(request::Column::Id);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn find_by_category(
        &self,
        category: RequestCategory,
    ) -> AppResult<Vec<request::Model>> {
        let query = request::Entity::find()
            .filter(request::Column::Category.eq(category))
            .order_by_desc(request::Column::CreatedAt)
            .order_by_desc(request::Column::Id);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn insert(&self, request: request::Model) -> AppResult<request::Model> {
        let mut active = request.into_active_model().reset_all();
        active.id = NotSet;
        with_conn!(&self.conn, |db| active
            .insert(db)
            .await
            .map_err(unique_violation_as(AppError::DuplicateIdentifier)))
    }

    async fn update(&self, request: request::Model) -> AppResult<request::Model> {
        let active = request.into_active_model().reset_all();
        with_conn!(&self.conn, |db| active
            .update(db)
            .await
            .map_err(not_updated_as_not_found))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        with_conn!(&self.conn, |db| {
            let result = request::Entity::delete_by_id(id).exec(db).await?;
            Ok(result.rows_affected > 0)
        })
    }
});

// =========================================================================
// InMemory Implementation
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryRequestRepository {
    requests: Arc<RwLock<Vec<request::Model>>>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut rows: Vec<request::Model>) -> Vec<request::Model> {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    rows
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<request::Model>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        category: RequestCategory,
    ) -> AppResult<Vec<request::Model>> {
        let requests = self.requests.read().await;
        Ok(newest_first(
            requests
                .iter()
                .filter(|r| r.user_id == user_id && r.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_category(
        &self,
        category: RequestCategory,
    ) -> AppResult<Vec<request::Model>> {
        let requests = self.requests.read().await;
        Ok(newest_first(
            requests
                .iter()
                .filter(|r| r.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, request: request::Model) -> AppResult<request::Model> {
        let mut requests = self.requests.write().await;
        if requests.iter().any(|r| r.request_id == request.request_id) {
            return Err(AppError::DuplicateIdentifier);
        }

        let next_id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let created = request::Model {
            id: next_id,
            ..request
        };
        requests.push(created.clone());
        Ok(created)
    }

    async fn update(&self, request: request::Model) -> AppResult<request::Model> {
        let mut requests = self.requests.write().await;
        let existing = requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(AppError::NotFound)?;
        *existing = request.clone();
        Ok(request)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|r| r.id != id);
        Ok(requests.len() != before)
    }

    fn with_transaction(&self, _uow: &dyn UnitOfWork) -> Option<Box<dyn RequestRepository>> {
        Some(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn row(id: i32, request_id: &str, day: u32) -> request::Model {
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 7, day)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        request::Model {
            id,
            request_id: request_id.to_owned(),
            user_id: 1,
            category: RequestCategory::Red,
            project_name: "関東飲食".to_owned(),
            wish_num: 100,
            area_selection: json!([["関東", ["東京都", "神奈川県"]]]),
            work_selection: Some(json!([["飲食", ["居酒屋"]]])),
            area_memo: None,
            tags: None,
            detail_condition: None,
            portal_site: None,
            complete_state: 0,
            cancel_state: 0,
            list_count: None,
            file_path: None,
            file_name: None,
            row_count: None,
            created_at: stamp,
            request_at: None,
            delivery_at: None,
            updated_at: stamp,
        }
    }

    #[tokio::test]
    async fn test_postgres_find_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(4, "q1w2e", 1)]])
            .into_connection();
        let repo = PostgresRequestRepository::new(Arc::new(db));

        let found = repo.find_by_id(4).await.unwrap().expect("row");
        assert_eq!(found.request_id, "q1w2e");
        assert_eq!(found.category, RequestCategory::Red);
        assert_eq!(found.area_selection, json!([["関東", ["東京都", "神奈川県"]]]));
    }

    #[tokio::test]
    async fn test_in_memory_lists_newest_first_per_category() {
        let repo = InMemoryRequestRepository::new();
        repo.insert(row(0, "aaaaa", 1)).await.unwrap();
        repo.insert(row(0, "bbbbb", 3)).await.unwrap();
        repo.insert(request::Model {
            category: RequestCategory::Blue,
            ..row(0, "ccccc", 2)
        })
        .await
        .unwrap();

        let red: Vec<_> = repo
            .find_by_user(1, RequestCategory::Red)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.request_id)
            .collect();
        assert_eq!(red, vec!["bbbbb", "aaaaa"]);
        assert_eq!(repo.find_by_category(RequestCategory::Blue).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_duplicate_request_id() {
        let repo = InMemoryRequestRepository::new();
        repo.insert(row(0, "aaaaa", 1)).await.unwrap();
        let err = repo.insert(row(0, "aaaaa", 2)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier));
    }
}
