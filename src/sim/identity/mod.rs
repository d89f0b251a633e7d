//! Visitor identity module
//!
//! Best-effort stable identifier for rate limiting: public IP first, a
//! locally persisted random token last.

pub mod api;
pub mod models;
pub mod service;

pub use api::IpLookupApi;
pub use models::{IdentitySource, VisitorIdentifier};
pub use service::IdentityResolver;
