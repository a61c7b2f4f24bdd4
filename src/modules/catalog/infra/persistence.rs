use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::catalog::entities::catalog_item;
use crate::modules::catalog::repository::{CatalogRepository, UpsertOutcome};
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::SeaOrmRepository;
use crate::shared::repository::UnitOfWork;
use crate::{impl_sea_orm_repo, with_conn};

// =========================================================================
// Postgres Implementation
// =========================================================================

pub type PostgresCatalogRepository = SeaOrmRepository<catalog_item::Entity>;

impl_sea_orm_repo!(PostgresCatalogRepository, CatalogRepository, {
    async fn find_by_url(&self, url: &str) -> AppResult<Option<catalog_item::Model>> {
        let query = catalog_item::Entity::find().filter(catalog_item::Column::Url.eq(url));
        with_conn!(&self.conn, |db| query.one(db).await.map_err(AppError::DbError))
    }

    async fn find_by_categories(
        &self,
        categories: &[String],
    ) -> AppResult<Vec<catalog_item::Model>> {
        if categories.is_empty() {
            return Ok(vec![]);
        }
        let query = catalog_item::Entity::find()
            .filter(catalog_item::Column::Category.is_in(categories.to_vec()))
            .order_by_asc(catalog_item::Column::Id);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn list(
        &self,
        category: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<catalog_item::Model>> {
        let mut query = catalog_item::Entity::find().order_by_asc(catalog_item::Column::Id);
        if let Some(category) = category {
            query = query.filter(catalog_item::Column::Category.eq(category));
        }
        let query = query.limit(limit).offset(offset);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn upsert_by_url(&self, item: catalog_item::Model) -> AppResult<UpsertOutcome> {
        let url = item.url.clone();
        let mut active = item.into_active_model().reset_all();
        active.id = NotSet;

        let on_conflict = OnConflict::column(catalog_item::Column::Url)
            .update_columns([
                catalog_item::Column::Company,
                catalog_item::Column::PostalCode,
                catalog_item::Column::Address,
                catalog_item::Column::Phone,
                catalog_item::Column::Fax,
                catalog_item::Column::Category,
                catalog_item::Column::UpdatedAt,
            ])
            .to_owned();

        with_conn!(&self.conn, |db| {
            // Only used for reporting; the write itself is a single atomic upsert
            let existed = catalog_item::Entity::find()
                .filter(catalog_item::Column::Url.eq(url.as_str()))
                .one(db)
                .await?
                .is_some();

            catalog_item::Entity::insert(active)
                .on_conflict(on_conflict)
                .exec(db)
                .await?;

            Ok(if existed {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Inserted
            })
        })
    }
});

// =========================================================================
// InMemory Implementation
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    items: Arc<RwLock<Vec<catalog_item::Model>>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_by_url(&self, url: &str) -> AppResult<Option<catalog_item::Model>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.url == url).cloned())
    }

    async fn find_by_categories(
        &self,
        categories: &[String],
    ) -> AppResult<Vec<catalog_item::Model>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|i| categories.contains(&i.category))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        category: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<catalog_item::Model>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn upsert_by_url(&self, item: catalog_item::Model) -> AppResult<UpsertOutcome> {
        let mut items = self.items.write().await;

        if let Some(existing) = items.iter_mut().find(|i| i.url == item.url) {
            *existing = catalog_item::Model {
                id: existing.id,
                created_at: existing.created_at,
                ..item
            };
            return Ok(UpsertOutcome::Updated);
        }

        let next_id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        items.push(catalog_item::Model { id: next_id, ..item });
        Ok(UpsertOutcome::Inserted)
    }

    fn with_transaction(&self, _uow: &dyn UnitOfWork) -> Option<Box<dyn CatalogRepository>> {
        Some(Box::new(self.clone()))
    }
}
