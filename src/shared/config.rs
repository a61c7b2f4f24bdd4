use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} must be a valid number, got `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub server_host: String,
    pub server_port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub password_reset_url: String,
    pub admin_name: String,
    pub admin_email: String,
    /// Manager account seeded at startup; no seeding when unset.
    pub admin_password: Option<String>,
}

impl Config {
    pub fn init() -> Result<Self, ConfigError> {
        dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
        let is_dev = app_env == "dev";

        // Dev runs on in-memory repositories, so the database and secret may be absent
        let database_url = required_unless_dev("DATABASE_URL", is_dev, "")?;
        let jwt_secret = required_unless_dev("JWT_SECRET", is_dev, "dev_secret_change_me")?;

        Ok(Self {
            database_url,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", "100")?,
            database_min_connections: parsed("DATABASE_MIN_CONNECTIONS", "5")?,
            database_connect_timeout: parsed("DATABASE_CONNECT_TIMEOUT", "8")?,
            database_idle_timeout: parsed("DATABASE_IDLE_TIMEOUT", "8")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parsed("SERVER_PORT", "3000")?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env,
            jwt_secret,
            jwt_ttl_minutes: parsed("JWT_TTL_MINUTES", "60")?,
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: parsed("SMTP_PORT", "587")?,
            smtp_user: env::var("SMTP_USER").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            password_reset_url: env::var("PASSWORD_RESET_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/reset-password".to_string()),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@doctrack.jp".to_string()),
            // The in-memory store starts empty on every run, so dev always gets a manager
            admin_password: env::var("ADMIN_PASSWORD")
                .ok()
                .or_else(|| is_dev.then(|| "DockTrack".to_string())),
        })
    }

    pub fn is_dev(&self) -> bool {
        self.app_env == "dev"
    }
}

fn required_unless_dev(
    key: &'static str,
    is_dev: bool,
    dev_default: &str,
) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(_) if is_dev => Ok(dev_default.to_string()),
        Err(_) => Err(ConfigError::Missing(key)),
    }
}

fn parsed<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "".to_string(),
        database_max_connections: 100,
        database_min_connections: 5,
        database_connect_timeout: 8,
        database_idle_timeout: 8,
        server_host: "localhost".to_string(),
        server_port: 3000,
        rust_log: "info".to_string(),
        app_env: "test".to_string(),
        jwt_secret: "test_secret".to_string(),
        jwt_ttl_minutes: 60,
        smtp_host: "".to_string(),
        smtp_port: 587,
        smtp_user: "".to_string(),
        smtp_password: "".to_string(),
        password_reset_url: "http://localhost:3000/auth/reset-password".to_string(),
        admin_name: "Admin".to_string(),
        admin_email: "admin@doctrack.jp".to_string(),
        admin_password: Some("DockTrack".to_string()),
    }
}
