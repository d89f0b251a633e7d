//! Local SQLite storage: builds the pool and runs the sqlx migrations.
//!
//! The schema lives in `migrations/` at the crate root and is applied by
//! `sqlx::migrate!()` on every open.

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::debug;

/// Open (or create) the local database and apply pending migrations
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    debug!("[LocalDB] opening {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .with_context(|| format!("failed to open SQLite database: {}", db_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run local storage migrations")?;

    Ok(pool)
}

/// Turn a bare file path into a `sqlite://` URL that creates the file on demand
pub fn sqlite_url_for_path(path: &std::path::Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}
