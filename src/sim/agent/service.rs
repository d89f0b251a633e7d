//! Agent configuration service
//!
//! Loads the effective configuration at session start and persists the
//! visitor's override on explicit save.

use crate::sim::agent::api::AgentDefaultsApi;
use crate::sim::agent::models::{AgentConfiguration, AgentDefaults};
use crate::sim::local_store::{LocalStore, KEY_AGENT_NAME, KEY_SYSTEM_PROMPT};
use anyhow::Result;
use tracing::{error, info, warn};

pub struct AgentConfigService {
    /// `None` in offline mode: built-in defaults, no webhook
    api: Option<AgentDefaultsApi>,
    store: LocalStore,
}

impl AgentConfigService {
    pub fn new(api: Option<AgentDefaultsApi>, store: LocalStore) -> Self {
        Self { api, store }
    }

    /// Effective configuration. Failures on either side degrade to defaults.
    pub async fn load(&self) -> AgentConfiguration {
        let defaults: Option<AgentDefaults> = match &self.api {
            Some(api) => match api.fetch_defaults().await {
                Ok(d) => Some(d),
                Err(e) => {
                    error!("[AgentConfig] fetching site defaults failed: {:#}", e);
                    None
                }
            },
            None => None,
        };

        let prompt_override = self.read_override(KEY_SYSTEM_PROMPT).await;
        let name_override = self.read_override(KEY_AGENT_NAME).await;

        let config = AgentConfiguration::layered(defaults.as_ref(), prompt_override, name_override);
        info!(
            "[AgentConfig] ✅ loaded (name: {}, webhook: {})",
            config.display_name,
            if config.webhook_url.is_some() { "configured" } else { "none" }
        );
        config
    }

    async fn read_override(&self, key: &str) -> Option<String> {
        self.store.get(key).await.unwrap_or_else(|e| {
            warn!("[AgentConfig] reading {} failed: {:#}", key, e);
            None
        })
    }

    /// Persist the visitor's override; `None` leaves the stored name untouched
    pub async fn save_override(&self, system_prompt: &str, display_name: Option<&str>) -> Result<()> {
        self.store.set(KEY_SYSTEM_PROMPT, system_prompt).await?;
        if let Some(name) = display_name {
            self.store.set(KEY_AGENT_NAME, name).await?;
        }
        info!("[AgentConfig] 💾 visitor override saved");
        Ok(())
    }
}
