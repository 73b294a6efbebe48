use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;
use std::time::Duration;

/// Connects the pool from `DATABASE_URL`. Write paths here are short
/// transactions around counter updates, so the pool favors a low floor and
/// a short acquire timeout over a large standing pool.
pub async fn get_database() -> Result<DatabaseConnection> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(env_u32("DB_POOL_MAX", 16))
        .min_connections(env_u32("DB_POOL_MIN", 1))
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(120))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(env_bool("DB_SQLX_LOGGING", false));

    Database::connect(opt)
        .await
        .context("Failed to connect to database")
}

fn env_u32(key: &str, default: u32) -> u32 {
    parse_or(env::var(key).ok().as_deref(), default)
}

fn env_bool(key: &str, default: bool) -> bool {
    parse_or(env::var(key).ok().as_deref(), default)
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
