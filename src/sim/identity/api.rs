//! Public IP lookup HTTP client
//!
//! Two independent providers with different response shapes. One attempt
//! each, transport defaults for timeouts.

use crate::sim::error::SimError;
use crate::sim::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Deserialize)]
struct PrimaryLookupResp {
    #[serde(default)]
    ip: Option<String>,
}

#[derive(Deserialize)]
struct SecondaryLookupResp {
    #[serde(rename = "ipAddress", default)]
    ip_address: Option<String>,
}

pub struct IpLookupApi {
    client: reqwest::Client,
    primary_url: String,
    secondary_url: String,
}

impl IpLookupApi {
    pub fn new(client: reqwest::Client, primary_url: String, secondary_url: String) -> Self {
        Self {
            client,
            primary_url,
            secondary_url,
        }
    }

    /// Ask the primary provider (`{"ip": ...}`)
    pub async fn lookup_primary(&self) -> Result<String> {
        info!("[IpLookup] 📡 querying primary provider");
        debug!("[IpLookup]   URL: {}", self.primary_url);

        let response = self
            .client
            .get(&self.primary_url)
            .send()
            .await
            .context("primary IP lookup request failed")?;

        let resp: PrimaryLookupResp = handle_http_response(response, "primary IP lookup").await?;
        non_empty(resp.ip, "ip")
    }

    /// Ask the secondary provider (`{"ipAddress": ...}`)
    pub async fn lookup_secondary(&self) -> Result<String> {
        info!("[IpLookup] 📡 querying secondary provider");
        debug!("[IpLookup]   URL: {}", self.secondary_url);

        let response = self
            .client
            .get(&self.secondary_url)
            .send()
            .await
            .context("secondary IP lookup request failed")?;

        let resp: SecondaryLookupResp =
            handle_http_response(response, "secondary IP lookup").await?;
        non_empty(resp.ip_address, "ipAddress")
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SimError::MissingField(field).into()),
    }
}
