use crate::shared::error::AppResult;
use async_trait::async_trait;
use std::any::{Any, TypeId};

/// Declares a repository trait whose implementations can be rebound to an
/// open [`UnitOfWork`].
#[macro_export]
macro_rules! define_repo {
    ($(#[$meta:meta])* $trait_name:ident, { $($methods:tt)* }) => {
        $(#[$meta])*
        #[async_trait::async_trait]
        pub trait $trait_name: Send + Sync {
            $($methods)*

            fn with_transaction(
                &self,
                uow: &dyn $crate::shared::repository::UnitOfWork,
            ) -> Option<Box<dyn $trait_name>>;
        }
    };
}

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
pub trait UnitOfWork: AsAny + Send + Sync {
    async fn commit(self: Box<Self>) -> AppResult<()>;
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

#[async_trait]
pub trait RepositoryManager: Send + Sync {
    fn get_repository(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)>;

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

impl dyn RepositoryManager {
    pub fn get<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.get_repository(TypeId::of::<T>())
            .and_then(|r| r.downcast_ref())
    }
}
