//! `site_settings` over Supabase PostgREST

use crate::sim::agent::models::{AgentDefaults, SITE_SETTINGS_TABLE};
use crate::sim::supabase::SupabaseConfig;
use crate::sim::types::handle_http_response;
use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use tracing::{debug, info};

/// Row holding the global simulator defaults
const SETTINGS_ROW_ID: i64 = 1;

pub struct AgentDefaultsApi {
    client: reqwest::Client,
    table_url: String,
}

impl AgentDefaultsApi {
    /// `client` must already carry the Supabase auth headers
    pub fn new(client: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            table_url: config.table_url(SITE_SETTINGS_TABLE),
        }
    }

    /// Fetch the server-wide defaults (read once per session)
    pub async fn fetch_defaults(&self) -> Result<AgentDefaults> {
        info!("[AgentAPI] 📡 fetching site defaults");
        debug!("[AgentAPI]   URL: {}", self.table_url);

        let response = self
            .client
            .get(&self.table_url)
            .header(ACCEPT, "application/vnd.pgrst.object+json")
            .query(&[
                ("id", format!("eq.{}", SETTINGS_ROW_ID)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .context("site settings request failed")?;

        handle_http_response(response, "site settings").await
    }
}
