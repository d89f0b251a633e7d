//! Chat webhook HTTP client

use crate::sim::error::SimError;
use crate::sim::serialization::generate_session_id;
use crate::sim::webhook::models::{WebhookRequest, SYSTEM_PROMPT_HEADER};
use anyhow::{Context, Result};
use reqwest::header::HeaderValue;
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub struct WebhookApi {
    client: reqwest::Client,
    url: String,
}

impl WebhookApi {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }

    /// POST one visitor message and return the raw payload.
    ///
    /// A 2xx body that is not JSON comes back as `Value::String`, so the
    /// reply resolver still gets to show it.
    pub async fn post_message(&self, message: &str, system_prompt: &str) -> Result<Value> {
        let session_id = generate_session_id();
        info!("[Webhook] 📤 sending message, session {}", session_id);
        debug!("[Webhook]   URL: {}", self.url);

        let mut request = self.client.post(&self.url).json(&WebhookRequest {
            message,
            session_id: &session_id,
            system_prompt,
        });

        // header values must be visible ASCII; the body copy always goes out
        match HeaderValue::from_str(system_prompt) {
            Ok(value) => request = request.header(SYSTEM_PROMPT_HEADER, value),
            Err(_) => warn!("[Webhook] system prompt not header-safe, sending in body only"),
        }

        let response = request.send().await.context("webhook request failed")?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("failed to read webhook response body")?;
        let body_str = String::from_utf8_lossy(&body);
        info!("[Webhook] response ({}): {}", status, body_str);

        if !status.is_success() {
            error!("[Webhook] non-success status {}", status);
            return Err(SimError::Http {
                status: status.as_u16(),
                body: body_str.into_owned(),
            }
            .into());
        }

        Ok(serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(body_str.into_owned())))
    }
}
