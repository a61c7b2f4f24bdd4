use super::entities::user;
use crate::define_repo;
use crate::shared::error::AppResult;

define_repo!(UserRepository, {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>>;
    async fn find_all(&self) -> AppResult<Vec<user::Model>>;

    /// Fails with `Conflict` when the e-mail is taken.
    async fn insert(&self, user: user::Model) -> AppResult<user::Model>;
    async fn update(&self, user: user::Model) -> AppResult<user::Model>;
    async fn delete(&self, id: i32) -> AppResult<bool>;
});
