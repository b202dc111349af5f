//! Database module: persistence gateway for user records.
//!
//! Layout:
//! - `models.rs`: domain rows and their decoded form
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: the `UserStore` capability and its SQLite implementation

pub mod models;
pub mod schema;
pub mod store;

pub use models::{NewUser, User};
pub use schema::SQLITE_INIT;
pub use store::{SqliteUserStore, UserStore};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

/// Open the shared connection pool and make sure the schema exists.
pub async fn connect(cfg: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let connect_opts = SqliteConnectOptions::from_str(cfg.url.as_str())
        .map_err(StoreError::Connect)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .acquire_timeout(cfg.acquire_timeout())
        .connect_with(connect_opts)
        .await
        .map_err(StoreError::Connect)?;

    apply_schema(&pool).await?;

    info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        "database pool initialized"
    );
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s)
            .execute(pool)
            .await
            .map_err(StoreError::query("apply_schema"))?;
    }
    Ok(())
}
