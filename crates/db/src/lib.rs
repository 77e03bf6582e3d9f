//! SQLite connection pool and migration runner for Folio modules.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

mod migrate;

pub use migrate::{migrate, Migration};

/// Shared connection pool handed to every module.
pub type DbPool = sqlx::SqlitePool;

/// Open a connection pool for the given SQLite URL.
///
/// The database file is created when missing. In-memory databases live only as
/// long as their connection, so they are pinned to a single connection that is
/// never recycled.
pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url '{url}'"))?
        .create_if_missing(true);

    let pool_options = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database '{url}'"))?;

    tracing::info!(target: "folio-db", url, "database pool ready");
    Ok(pool)
}

/// True when `err` is a UNIQUE or PRIMARY KEY constraint failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
            db.is_unique_violation() || matches!(db.code().as_deref(), Some("1555") | Some("2067"))
        }
        _ => false,
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
