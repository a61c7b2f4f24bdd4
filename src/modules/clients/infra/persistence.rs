use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::clients::entities::{client, client_cost};
use crate::modules::clients::repository::ClientRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::{
    SeaOrmRepository, not_updated_as_not_found, unique_violation_as,
};
use crate::shared::repository::UnitOfWork;
use crate::{impl_sea_orm_repo, with_conn};

// =========================================================================
// Postgres Implementation
// =========================================================================

pub type PostgresClientRepository = SeaOrmRepository<client::Entity>;

impl_sea_orm_repo!(PostgresClientRepository, ClientRepository, {
    async fn find_all(&self) -> AppResult<Vec<client::Model>> {
        let query = client::Entity::find().order_by_asc(client::Column::Id);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<client::Model>> {
        with_conn!(&self.conn, |db| client::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::DbError))
    }

    async fn find_by_contract_id(&self, contract_id: &str) -> AppResult<Option<client::Model>> {
        let query = client::Entity::find().filter(client::Column::ContractId.eq(contract_id));
        with_conn!(&self.conn, |db| query.one(db).await.map_err(AppError::DbError))
    }

    async fn insert(&self, client: client::Model) -> AppResult<client::Model> {
        let mut active = client.into_active_model().reset_all();
        active.id = NotSet;
        with_conn!(&self.conn, |db| active
            .insert(db)
            .await
            .map_err(unique_violation_as(AppError::DuplicateIdentifier)))
    }

    async fn update(&self, client: client::Model) -> AppResult<client::Model> {
        let active = client.into_active_model().reset_all();
        with_conn!(&self.conn, |db| active
            .update(db)
            .await
            .map_err(not_updated_as_not_found))
    }

    async fn find_cost(&self, client_id: i32) -> AppResult<Option<client_cost::Model>> {
        let query =
            client_cost::Entity::find().filter(client_cost::Column::ClientId.eq(client_id));
        with_conn!(&self.conn, |db| query.one(db).await.map_err(AppError::DbError))
    }

    async fn upsert_cost(&self, cost: client_cost::Model) -> AppResult<client_cost::Model> {
        let client_id = cost.client_id;
        let mut active = cost.into_active_model().reset_all();
        active.id = NotSet;

        let on_conflict = OnConflict::column(client_cost::Column::ClientId)
            .update_columns([
                client_cost::Column::Green,
                client_cost::Column::Blue,
                client_cost::Column::Yellow,
                client_cost::Column::Pink,
                client_cost::Column::Red,
                client_cost::Column::UpdatedAt,
            ])
            .to_owned();

        with_conn!(&self.conn, |db| {
            client_cost::Entity::insert(active)
                .on_conflict(on_conflict)
                .exec(db)
                .await?;

            client_cost::Entity::find()
                .filter(client_cost::Column::ClientId.eq(client_id))
                .one(db)
                .await?
                .ok_or(AppError::NotFound)
        })
    }
});

// =========================================================================
// InMemory Implementation
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<Vec<client::Model>>>,
    costs: Arc<RwLock<Vec<client_cost::Model>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_all(&self) -> AppResult<Vec<client::Model>> {
        Ok(self.clients.read().await.clone())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<client::Model>> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_contract_id(&self, contract_id: &str) -> AppResult<Option<client::Model>> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.contract_id == contract_id).cloned())
    }

    async fn insert(&self, client: client::Model) -> AppResult<client::Model> {
        let mut clients = self.clients.write().await;
        if clients.iter().any(|c| c.contract_id == client.contract_id) {
            return Err(AppError::DuplicateIdentifier);
        }

        let next_id = clients.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let created = client::Model {
            id: next_id,
            ..client
        };
        clients.push(created.clone());
        Ok(created)
    }

    async fn update(&self, client: client::Model) -> AppResult<client::Model> {
        let mut clients = self.clients.write().await;
        let existing = clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or(AppError::NotFound)?;
        *existing = client.clone();
        Ok(client)
    }

    async fn find_cost(&self, client_id: i32) -> AppResult<Option<client_cost::Model>> {
        let costs = self.costs.read().await;
        Ok(costs.iter().find(|c| c.client_id == client_id).cloned())
    }

    async fn upsert_cost(&self, cost: client_cost::Model) -> AppResult<client_cost::Model> {
        let mut costs = self.costs.write().await;
        if let Some(existing) = costs.iter_mut().find(|c| c.client_id == cost.client_id) {
            *existing = client_cost::Model {
                id: existing.id,
                ..cost
            };
            return Ok(existing.clone());
        }

        let next_id = costs.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let created = client_cost::Model {
            id: next_id,
            ..cost
        };
        costs.push(created.clone());
        Ok(created)
    }

    fn with_transaction(&self, _uow: &dyn UnitOfWork) -> Option<Box<dyn ClientRepository>> {
        Some(Box::new(self.clone()))
    }
}
