use super::entities::{enums::RequestCategory, request};
use crate::define_repo;
use crate::shared::error::AppResult;

define_repo!(RequestRepository, {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<request::Model>>;

    /// Newest first.
    async fn find_by_user(
        &self,
        user_id: i32,
        category: RequestCategory,
    ) -> AppResult<Vec<request::Model>>;

    /// Newest first.
    async fn find_by_category(&self, category: RequestCategory)
    -> AppResult<Vec<request::Model>>;

    /// Fails with `DuplicateIdentifier` when `request_id` is taken.
    async fn insert(&self, request: request::Model) -> AppResult<request::Model>;
    async fn update(&self, request: request::Model) -> AppResult<request::Model>;
    async fn delete(&self, id: i32) -> AppResult<bool>;
});
