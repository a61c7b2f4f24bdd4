use crate::modules::auth::providers::email::EmailProvider;
use crate::shared::config::Config;
use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::RepositoryManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo_manager: Arc<dyn RepositoryManager>,
    pub email_provider: Arc<dyn EmailProvider>,
}

impl AppState {
    /// Looks up a registered repository, e.g. `state.repo::<Arc<dyn UserRepository>>()`.
    pub fn repo<T: 'static + Send + Sync>(&self) -> AppResult<&T> {
        self.repo_manager.get::<T>().ok_or_else(|| {
            AppError::InternalServerError(format!(
                "{} not registered",
                std::any::type_name::<T>()
            ))
        })
    }
}
