//! Chat webhook module
//!
//! One POST per visitor message to the operator-configured endpoint; canned
//! replies when no endpoint is configured.

pub mod api;
pub mod models;

pub use api::WebhookApi;
pub use models::{WebhookRequest, CANNED_RESPONSES, WEBHOOK_ERROR_TEXT};
