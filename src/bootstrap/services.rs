use std::sync::Arc;

use crate::modules::auth::providers::email::{EmailProvider, SmtpMailer};
use crate::shared::config::Config;
use crate::shared::error::AppResult;

pub fn init_email_provider(config: &Config) -> AppResult<Arc<dyn EmailProvider>> {
    Ok(Arc::new(SmtpMailer::new(config)?))
}
