//! Rate limit ledger service
//!
//! `try_check_and_increment` reports storage failures; `check_and_increment`
//! is the fail-open wrapper the simulator uses.

use crate::sim::rate_limit::models::{RateLimitDecision, DEFAULT_MESSAGE_CEILING};
use crate::sim::rate_limit::store::LedgerStore;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct RateLimitLedger {
    store: Arc<dyn LedgerStore>,
    ceiling: i64,
}

impl RateLimitLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_ceiling(store, DEFAULT_MESSAGE_CEILING)
    }

    pub fn with_ceiling(store: Arc<dyn LedgerStore>, ceiling: i64) -> Self {
        Self { store, ceiling }
    }

    /// Read, check, write. Two visitors racing on the same identifier can
    /// both pass at `ceiling - 1`; enforcement is best-effort.
    pub async fn try_check_and_increment(&self, identifier: &str) -> Result<RateLimitDecision> {
        if identifier.is_empty() {
            debug!("[RateLimit] no identifier, skipping ledger");
            return Ok(RateLimitDecision::Unidentified);
        }

        let Some(record) = self.store.find_by_ip(identifier).await? else {
            self.store.insert_first(identifier).await?;
            info!("[RateLimit] 🆕 {} sent its first message", identifier);
            return Ok(RateLimitDecision::Created);
        };

        if record.message_count >= self.ceiling {
            warn!(
                "[RateLimit] 🚫 {} blocked at {}/{}",
                identifier, record.message_count, self.ceiling
            );
            return Ok(RateLimitDecision::Blocked {
                count: record.message_count,
            });
        }

        let count = record.message_count + 1;
        self.store.update_count(record.id, count, Utc::now()).await?;
        debug!("[RateLimit] {} at {}/{}", identifier, count, self.ceiling);
        Ok(RateLimitDecision::Incremented { count })
    }

    /// Returns whether the visitor may send. Storage errors allow the message.
    pub async fn check_and_increment(&self, identifier: &str) -> bool {
        match self.try_check_and_increment(identifier).await {
            Ok(decision) => decision.is_allowed(),
            Err(e) => {
                error!(
                    "[RateLimit] ledger unavailable for {}, failing open: {:#}",
                    identifier, e
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rate_limit::models::RateLimitRecord;
    use crate::sim::rate_limit::store::MemoryLedgerStore;
    use async_trait::async_trait;
    use chrono::DateTime;

    fn ledger(store: &Arc<MemoryLedgerStore>) -> RateLimitLedger {
        RateLimitLedger::new(store.clone())
    }

    #[tokio::test]
    async fn below_ceiling_increments_by_one() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = ledger(&store);

        for start in [1, 7, 14] {
            let ip = format!("10.0.0.{}", start);
            store.seed(&ip, start).await;
            assert!(ledger.check_and_increment(&ip).await);
            let row = store.get(&ip).await.unwrap();
            assert_eq!(row.message_count, start + 1);
            assert!(row.last_activity.is_some());
        }
    }

    #[tokio::test]
    async fn at_ceiling_blocks_without_mutation() {
        let store = Arc::new(MemoryLedgerStore::new());
        store.seed("10.0.0.1", 15).await;
        let writes_before = store.writes();

        let decision = ledger(&store)
            .try_check_and_increment("10.0.0.1")
            .await
            .unwrap();

        assert_eq!(decision, RateLimitDecision::Blocked { count: 15 });
        assert_eq!(store.get("10.0.0.1").await.unwrap().message_count, 15);
        assert_eq!(store.get("10.0.0.1").await.unwrap().last_activity, None);
        assert_eq!(store.writes(), writes_before);
    }

    #[tokio::test]
    async fn empty_identifier_fails_open_without_storage() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = ledger(&store);

        for _ in 0..20 {
            assert!(ledger.check_and_increment("").await);
        }
        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn sixteenth_message_is_blocked() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = ledger(&store);
        let ip = "203.0.113.7";

        assert_eq!(
            ledger.try_check_and_increment(ip).await.unwrap(),
            RateLimitDecision::Created
        );
        assert_eq!(store.get(ip).await.unwrap().message_count, 1);

        for n in 2..=15 {
            assert!(ledger.check_and_increment(ip).await, "message {} refused", n);
        }
        assert_eq!(store.get(ip).await.unwrap().message_count, 15);

        assert!(!ledger.check_and_increment(ip).await);
        assert_eq!(store.get(ip).await.unwrap().message_count, 15);
    }

    #[tokio::test]
    async fn custom_ceiling() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = RateLimitLedger::with_ceiling(store.clone(), 2);

        assert!(ledger.check_and_increment("a").await);
        assert!(ledger.check_and_increment("a").await);
        assert!(!ledger.check_and_increment("a").await);
    }

    struct BrokenStore {
        fail_reads: bool,
    }

    #[async_trait]
    impl LedgerStore for BrokenStore {
        async fn find_by_ip(&self, ip_address: &str) -> Result<Option<RateLimitRecord>> {
            if self.fail_reads {
                anyhow::bail!("connection reset");
            }
            Ok(Some(RateLimitRecord {
                id: 1,
                ip_address: ip_address.to_string(),
                message_count: 3,
                last_activity: None,
            }))
        }

        async fn insert_first(&self, _ip_address: &str) -> Result<()> {
            anyhow::bail!("insert rejected")
        }

        async fn update_count(&self, _id: i64, _count: i64, _at: DateTime<Utc>) -> Result<()> {
            anyhow::bail!("update rejected")
        }
    }

    #[tokio::test]
    async fn storage_errors_fail_open() {
        for fail_reads in [true, false] {
            let ledger = RateLimitLedger::new(Arc::new(BrokenStore { fail_reads }));
            assert!(ledger.try_check_and_increment("10.0.0.1").await.is_err());
            assert!(ledger.check_and_increment("10.0.0.1").await);
        }
    }
}
