pub mod database;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod web;

pub use error::AppError;

use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub username_cooldown_months: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
            access_token_expire_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            username_cooldown_months: std::env::var("USERNAME_COOLDOWN_MONTHS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}
