use serde::Deserialize;
use tracing::{debug, error, info};

use crate::sim::error::SimError;

/// PostgREST code for "`.single()` matched zero rows"
pub const PGRST_ROW_NOT_FOUND: &str = "PGRST116";

/// Error body returned by PostgREST on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct PostgrestError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestError {
    /// Best-effort parse; `None` when the body is not a PostgREST error object
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    pub fn is_row_not_found(&self) -> bool {
        self.code == PGRST_ROW_NOT_FOUND
    }
}

/// Shared HTTP response handling: log the body, check the status, deserialize.
///
/// Every API in the crate goes through this so that failures carry the
/// operation name and the raw body in the logs.
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> anyhow::Result<T> {
    use anyhow::Context;

    let status = response.status();

    // the body can only be read once
    let body_bytes = response
        .bytes()
        .await
        .with_context(|| format!("{}: failed to read response body", operation_name))?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    info!("[HTTP] {} response body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {} failed, status: {}, body: {}",
            operation_name, status, body_str
        );
        return Err(SimError::Http {
            status: status.as_u16(),
            body: body_str.into_owned(),
        }
        .into());
    }
    debug!("[HTTP] {} succeeded, status: {}", operation_name, status);

    let parsed: T = serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {} deserialization failed: {:?}\nraw body: {}",
            operation_name, e, body_str
        );
        anyhow::anyhow!("{}: failed to deserialize response: {:?}", operation_name, e)
    })?;

    Ok(parsed)
}

/// Check a response that has no interesting body (PostgREST `return=minimal`)
pub async fn expect_success(response: reqwest::Response, operation_name: &str) -> anyhow::Result<()> {
    let status = response.status();
    if status.is_success() {
        debug!("[HTTP] {} succeeded, status: {}", operation_name, status);
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    error!(
        "[HTTP] {} failed, status: {}, body: {}",
        operation_name, status, body
    );
    Err(SimError::Http {
        status: status.as_u16(),
        body,
    }
    .into())
}
