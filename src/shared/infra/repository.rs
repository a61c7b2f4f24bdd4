use async_trait::async_trait;
use sea_orm::*;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::{AsAny, RepositoryManager, UnitOfWork};

// =========================================================================
// Postgres Implementation (Generic Base)
// =========================================================================

#[derive(Clone)]
pub enum DbOrTxn {
    Conn(Arc<DatabaseConnection>),
    Txn(Arc<AsyncMutex<Option<DatabaseTransaction>>>),
}

#[derive(Clone)]
pub struct SeaOrmRepository<E>
where
    E: EntityTrait,
{
    pub conn: DbOrTxn,
    _marker: std::marker::PhantomData<E>,
}

impl<E> SeaOrmRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        tracing::debug!("Creating SeaOrmRepository for {}", std::any::type_name::<E>());
        Self {
            conn: DbOrTxn::Conn(db),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn with_transaction_internal(&self, uow: &dyn UnitOfWork) -> Option<Self> {
        let postgres_uow = uow.as_any().downcast_ref::<PostgresUnitOfWork>()?;
        Some(Self {
            conn: DbOrTxn::Txn(postgres_uow.txn.clone()),
            _marker: std::marker::PhantomData,
        })
    }
}

/// Runs `$body` against whichever handle the repository currently holds,
/// binding it to `$db`. Must be used inside a fn returning `AppResult`.
#[macro_export]
macro_rules! with_conn {
    ($conn:expr, |$db:ident| $body:expr) => {
        match $conn {
            $crate::shared::infra::repository::DbOrTxn::Conn(c) => {
                let $db = c.as_ref();
                $body
            }
            $crate::shared::infra::repository::DbOrTxn::Txn(mutex) => {
                let lock = mutex.lock().await;
                let $db = lock.as_ref().ok_or_else(|| {
                    $crate::shared::error::AppError::InternalServerError(
                        "Transaction already finished".to_string(),
                    )
                })?;
                $body
            }
        }
    };
}

// Macro to implement Repository Trait with boilerplate with_transaction
#[macro_export]
macro_rules! impl_sea_orm_repo {
    ($repo_type:ty, $trait_path:path, { $($methods:tt)* }) => {
        #[async_trait::async_trait]
        impl $trait_path for $repo_type {
            $($methods)*

            fn with_transaction(&self, uow: &dyn $crate::shared::repository::UnitOfWork) -> Option<Box<dyn $trait_path>> {
                 self.with_transaction_internal(uow)
                    .map(|r| Box::new(r) as Box<dyn $trait_path>)
            }
        }
    };
}

/// Maps a unique-constraint violation to `on_unique`, any other error to `DbError`.
pub fn unique_violation_as(on_unique: AppError) -> impl FnOnce(DbErr) -> AppError {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => on_unique,
        _ => AppError::DbError(err),
    }
}

/// `update()` on a vanished row surfaces as `RecordNotUpdated`.
pub fn not_updated_as_not_found(err: DbErr) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::NotFound,
        other => AppError::DbError(other),
    }
}

pub struct PostgresRepositoryManager {
    db: Arc<DatabaseConnection>,
    repos: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl PostgresRepositoryManager {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            repos: HashMap::new(),
        }
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, repo: T) {
        self.repos.insert(TypeId::of::<T>(), Arc::new(repo));
    }
}

#[async_trait]
impl RepositoryManager for PostgresRepositoryManager {
    fn get_repository(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.repos.get(&type_id).map(|boxed| boxed.as_ref())
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await.map_err(AppError::DbError)?;
        Ok(Box::new(PostgresUnitOfWork {
            txn: Arc::new(AsyncMutex::new(Some(txn))),
        }))
    }
}

pub struct PostgresUnitOfWork {
    txn: Arc<AsyncMutex<Option<DatabaseTransaction>>>,
}

impl AsAny for PostgresUnitOfWork {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut lock = self.txn.lock().await;
        if let Some(txn) = lock.take() {
            txn.commit().await.map_err(AppError::DbError)
        } else {
            Ok(())
        }
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut lock = self.txn.lock().await;
        if let Some(txn) = lock.take() {
            txn.rollback().await.map_err(AppError::DbError)
        } else {
            Ok(())
        }
    }
}

// =========================================================================
// InMemory Implementation
// =========================================================================

#[derive(Default, Clone)]
pub struct InMemoryRepositoryManager {
    repos: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl InMemoryRepositoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, repo: T) {
        self.repos.insert(TypeId::of::<T>(), Arc::new(repo));
    }
}

pub struct InMemoryUnitOfWork;

impl AsAny for InMemoryUnitOfWork {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
impl RepositoryManager for InMemoryRepositoryManager {
    fn get_repository(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.repos.get(&type_id).map(|boxed| boxed.as_ref())
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
