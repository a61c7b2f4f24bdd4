use super::entities::{client, client_cost};
use crate::define_repo;
use crate::shared::error::AppResult;

define_repo!(ClientRepository, {
    async fn find_all(&self) -> AppResult<Vec<client::Model>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<client::Model>>;
    async fn find_by_contract_id(&self, contract_id: &str) -> AppResult<Option<client::Model>>;

    /// Fails with `DuplicateIdentifier` when the contract ID is taken.
    async fn insert(&self, client: client::Model) -> AppResult<client::Model>;
    async fn update(&self, client: client::Model) -> AppResult<client::Model>;

    async fn find_cost(&self, client_id: i32) -> AppResult<Option<client_cost::Model>>;

    /// Insert-or-replace keyed by `client_id`, in one statement.
    async fn upsert_cost(&self, cost: client_cost::Model) -> AppResult<client_cost::Model>;
});
