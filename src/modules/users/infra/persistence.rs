use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::users::entities::user;
use crate::modules::users::repository::UserRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::{
    SeaOrmRepository, not_updated_as_not_found, unique_violation_as,
};
use crate::shared::repository::UnitOfWork;
use crate::{impl_sea_orm_repo, with_conn};

const EMAIL_TAKEN: &str = "Email is already registered.";

// =========================================================================
// Postgres Implementation
// =========================================================================

pub type PostgresUserRepository = SeaOrmRepository<user::Entity>;

impl_sea_orm_repo!(PostgresUserRepository, UserRepository, {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>> {
        with_conn!(&self.conn, |db| user::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::DbError))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        let query = user::Entity::find().filter(user::Column::Email.eq(email));
        with_conn!(&self.conn, |db| query.one(db).await.map_err(AppError::DbError))
    }

    async fn find_all(&self) -> AppResult<Vec<user::Model>> {
        let query = user::Entity::find().order_by_asc(user::Column::Id);
        with_conn!(&self.conn, |db| query.all(db).await.map_err(AppError::DbError))
    }

    async fn insert(&self, user: user::Model) -> AppResult<user::Model> {
        let mut active = user.into_active_model().reset_all();
        active.id = NotSet;
        with_conn!(&self.conn, |db| active
            .insert(db)
            .await
            .map_err(unique_violation_as(AppError::Conflict(EMAIL_TAKEN.to_string()))))
    }

    async fn update(&self, user: user::Model) -> AppResult<user::Model> {
        let active = user.into_active_model().reset_all();
        with_conn!(&self.conn, |db| active.update(db).await.map_err(|err| {
            match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict(EMAIL_TAKEN.to_string())
                }
                _ => not_updated_as_not_found(err),
            }
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        with_conn!(&self.conn, |db| {
            let result = user::Entity::delete_by_id(id).exec(db).await?;
            Ok(result.rows_affected > 0)
        })
    }
});

// =========================================================================
// InMemory Implementation
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<user::Model>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<user::Model>> {
        Ok(self.users.read().await.clone())
    }

    async fn insert(&self, user: user::Model) -> AppResult<user::Model> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = user::Model { id: next_id, ..user };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, user: user::Model) -> AppResult<user::Model> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::NotFound)?;
        *existing = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    fn with_transaction(&self, _uow: &dyn UnitOfWork) -> Option<Box<dyn UserRepository>> {
        Some(Box::new(self.clone()))
    }
}
