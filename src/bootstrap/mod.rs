pub mod database;
pub mod repositories;
pub mod seed;
pub mod services;

use crate::shared::{config::Config, error::AppResult, state::AppState};
use std::sync::Arc;

/// Dev runs entirely in memory; every other environment needs Postgres.
pub async fn create_app_state(config: &Config) -> AppResult<AppState> {
    let db = if config.is_dev() {
        None
    } else {
        Some(database::connect_postgres(config).await?)
    };

    let repo_manager = repositories::init_repo_manager(db);
    seed::seed_manager(config, &repo_manager).await?;
    let email_provider = services::init_email_provider(config)?;

    Ok(AppState {
        config: Arc::new(config.clone()),
        repo_manager,
        email_provider,
    })
}
