use super::entities::catalog_item;
use crate::define_repo;
use crate::shared::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

define_repo!(CatalogRepository, {
    async fn find_by_url(&self, url: &str) -> AppResult<Option<catalog_item::Model>>;

    /// Snapshot of every item whose category is one of `categories`.
    async fn find_by_categories(
        &self,
        categories: &[String],
    ) -> AppResult<Vec<catalog_item::Model>>;

    async fn list(
        &self,
        category: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<catalog_item::Model>>;

    /// Inserts, or overwrites every field except `id`/`created_at` of the
    /// item sharing the same URL.
    async fn upsert_by_url(&self, item: catalog_item::Model) -> AppResult<UpsertOutcome>;
});
