//! Agent configuration module
//!
//! Server-wide defaults from `site_settings`, layered under the visitor's
//! local override.

pub mod api;
pub mod models;
pub mod service;

pub use api::AgentDefaultsApi;
pub use models::{AgentConfiguration, AgentDefaults};
pub use service::AgentConfigService;
