//! Ledger storage seam
//!
//! The ledger only needs three primitive operations; they map 1:1 onto the
//! PostgREST calls in [`super::api`]. Insert and update are separate calls,
//! there is no conditional update.

use crate::sim::rate_limit::models::RateLimitRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Exact-match lookup on `ip_address`
    async fn find_by_ip(&self, ip_address: &str) -> Result<Option<RateLimitRecord>>;

    /// Create the row for a first-time identifier with `message_count = 1`
    async fn insert_first(&self, ip_address: &str) -> Result<()>;

    /// Overwrite `message_count` and `last_activity` of row `id`
    async fn update_count(
        &self,
        id: i64,
        message_count: i64,
        last_activity: DateTime<Utc>,
    ) -> Result<()>;
}

/// In-process store, used when no Supabase project is configured
#[derive(Default)]
pub struct MemoryLedgerStore {
    rows: Mutex<HashMap<String, RateLimitRecord>>,
    next_id: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, ip_address: &str) -> Option<RateLimitRecord> {
        self.rows.lock().await.get(ip_address).cloned()
    }

    /// Seed a row directly, bypassing the ledger
    pub async fn seed(&self, ip_address: &str, message_count: i64) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows.lock().await.insert(
            ip_address.to_string(),
            RateLimitRecord {
                id,
                ip_address: ip_address.to_string(),
                message_count,
                last_activity: None,
            },
        );
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn find_by_ip(&self, ip_address: &str) -> Result<Option<RateLimitRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().await.get(ip_address).cloned())
    }

    async fn insert_first(&self, ip_address: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().await;
        if rows.contains_key(ip_address) {
            // mirrors the unique constraint on ip_address
            anyhow::bail!("duplicate key value violates unique constraint on ip_address");
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        rows.insert(
            ip_address.to_string(),
            RateLimitRecord {
                id,
                ip_address: ip_address.to_string(),
                message_count: 1,
                last_activity: Some(Utc::now()),
            },
        );
        Ok(())
    }

    async fn update_count(
        &self,
        id: i64,
        message_count: i64,
        last_activity: DateTime<Utc>,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().await;
        // PostgREST PATCH on a missing id is a silent no-op, same here
        if let Some(row) = rows.values_mut().find(|r| r.id == id) {
            row.message_count = message_count;
            row.last_activity = Some(last_activity);
        }
        Ok(())
    }
}
