use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::modules::catalog::infra::persistence::{
    InMemoryCatalogRepository, PostgresCatalogRepository,
};
use crate::modules::catalog::repository::CatalogRepository;
use crate::modules::clients::infra::persistence::{
    InMemoryClientRepository, PostgresClientRepository,
};
use crate::modules::clients::repository::ClientRepository;
use crate::modules::requests::infra::persistence::{
    InMemoryRequestRepository, PostgresRequestRepository,
};
use crate::modules::requests::repository::RequestRepository;
use crate::modules::users::infra::persistence::{InMemoryUserRepository, PostgresUserRepository};
use crate::modules::users::repository::UserRepository;
use crate::shared::infra::repository::{InMemoryRepositoryManager, PostgresRepositoryManager};
use crate::shared::repository::RepositoryManager;

/// Repositories are registered as `Arc<dyn Trait>` and looked up by that type.
pub fn init_repo_manager(db: Option<DatabaseConnection>) -> Arc<dyn RepositoryManager> {
    match db {
        None => {
            tracing::warn!("Using InMemory Repository Manager; data is lost on restart");
            let mut manager = InMemoryRepositoryManager::new();
            manager.register::<Arc<dyn UserRepository>>(Arc::new(InMemoryUserRepository::new()));
            manager
                .register::<Arc<dyn ClientRepository>>(Arc::new(InMemoryClientRepository::new()));
            manager.register::<Arc<dyn CatalogRepository>>(Arc::new(
                InMemoryCatalogRepository::new(),
            ));
            manager.register::<Arc<dyn RequestRepository>>(Arc::new(
                InMemoryRequestRepository::new(),
            ));
            Arc::new(manager)
        }
        Some(db) => {
            let db = Arc::new(db);
            let mut manager = PostgresRepositoryManager::new(db.clone());
            manager.register::<Arc<dyn UserRepository>>(Arc::new(PostgresUserRepository::new(
                db.clone(),
            )));
            manager.register::<Arc<dyn ClientRepository>>(Arc::new(
                PostgresClientRepository::new(db.clone()),
            ));
            manager.register::<Arc<dyn CatalogRepository>>(Arc::new(
                PostgresCatalogRepository::new(db.clone()),
            ));
            manager.register::<Arc<dyn RequestRepository>>(Arc::new(
                PostgresRequestRepository::new(db),
            ));
            Arc::new(manager)
        }
    }
}
