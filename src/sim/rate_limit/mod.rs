//! Per-visitor message ledger
//!
//! Read, check, then increment against an external table. Not atomic; the
//! read/write race is accepted and enforcement is best-effort.

pub mod api;
pub mod models;
pub mod service;
pub mod store;

pub use api::SupabaseLedgerApi;
pub use models::{RateLimitDecision, RateLimitRecord, DEFAULT_MESSAGE_CEILING};
pub use service::RateLimitLedger;
pub use store::{LedgerStore, MemoryLedgerStore};
