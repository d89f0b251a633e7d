//! Domain errors that callers match on.
//!
//! Everything else in the crate propagates `anyhow::Error` with context.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Blank input, rejected before any network call
    #[error("message is empty")]
    EmptyMessage,

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("missing field `{0}` in response")]
    MissingField(&'static str),
}
