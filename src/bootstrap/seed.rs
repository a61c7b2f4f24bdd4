use chrono::Utc;
use std::sync::Arc;

use crate::modules::users::repository::UserRepository;
use crate::modules::users::service::UserService;
use crate::shared::config::Config;
use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::RepositoryManager;

/// Makes sure a manager account exists so manager-only routes are reachable
/// on a fresh database.
pub async fn seed_manager(
    config: &Config,
    repo_manager: &Arc<dyn RepositoryManager>,
) -> AppResult<()> {
    let Some(password) = config.admin_password.as_deref() else {
        tracing::warn!("ADMIN_PASSWORD not set; no manager account seeded");
        return Ok(());
    };

    let users = repo_manager
        .get::<Arc<dyn UserRepository>>()
        .ok_or_else(|| AppError::InternalServerError("UserRepository not registered".to_string()))?;

    UserService::ensure_manager(
        users.as_ref(),
        &config.admin_name,
        &config.admin_email,
        password,
        Utc::now().naive_utc(),
    )
    .await?;
    Ok(())
}
