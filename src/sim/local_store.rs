//! Visitor-local persisted storage (DAO).
//!
//! Plays the role of browser local storage: a handful of string values kept
//! on this device only, under fixed keys.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// Stored system prompt override
pub const KEY_SYSTEM_PROMPT: &str = "vlow_system_prompt";
/// Stored assistant display name override
pub const KEY_AGENT_NAME: &str = "vlow_agent_name";
/// Fallback visitor token, written only when both IP lookups fail
pub const KEY_VISITOR_ID: &str = "vlow_visitor_id";

/// Key/value DAO over the `local_storage` table
#[derive(Clone)]
pub struct LocalStore {
    db: Pool<Sqlite>,
}

impl LocalStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Open the database at `db_url`, migrating it if needed
    pub async fn open(db_url: &str) -> Result<Self> {
        let db = crate::sim::db::create_sqlite_pool_with_migration(db_url).await?;
        Ok(Self::new(db))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM local_storage WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("failed to read local key {}", key))?;

        let value = row.map(|r| r.get::<String, _>("value"));
        debug!("[LocalStore] get {} -> {:?}", key, value.is_some());
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.db)
        .await
        .with_context(|| format!("failed to write local key {}", key))?;

        debug!("[LocalStore] set {}", key);
        Ok(())
    }
}
