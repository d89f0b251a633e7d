//! Agent configuration models

use serde::{Deserialize, Serialize};

/// Prompt used when neither the visitor nor the server supplies one
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Kamu adalah asisten virtual yang ramah dan membantu untuk Vlow.AI.";

pub const DEFAULT_AGENT_NAME: &str = "Vlow.AI Assistant";

pub const SITE_SETTINGS_TABLE: &str = "site_settings";

/// The single `site_settings` row (`id = 1`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentDefaults {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub n8n_webhook_url: Option<String>,
}

/// Effective configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    pub system_prompt: String,
    pub display_name: String,
    /// `None` means canned replies
    pub webhook_url: Option<String>,
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            display_name: DEFAULT_AGENT_NAME.to_string(),
            webhook_url: None,
        }
    }
}

impl AgentConfiguration {
    /// Layer local overrides over server defaults; blank strings count as unset
    pub fn layered(
        defaults: Option<&AgentDefaults>,
        prompt_override: Option<String>,
        name_override: Option<String>,
    ) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let system_prompt = non_blank(prompt_override)
            .or_else(|| non_blank(defaults.and_then(|d| d.system_prompt.clone())))
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let display_name =
            non_blank(name_override).unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());
        let webhook_url = non_blank(defaults.and_then(|d| d.n8n_webhook_url.clone()))
            .map(|url| url.trim().to_string());

        Self {
            system_prompt,
            display_name,
            webhook_url,
        }
    }
}
