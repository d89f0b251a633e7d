//! Visitor identity models

use serde::{Deserialize, Serialize};

/// Default primary lookup, answers `{"ip": "..."}`
pub const DEFAULT_PRIMARY_LOOKUP_URL: &str = "https://api.ipify.org?format=json";
/// Default secondary lookup, answers `{"ipAddress": "..."}`
pub const DEFAULT_SECONDARY_LOOKUP_URL: &str = "https://api.db-ip.com/v2/free/self";

/// Where an identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    PrimaryLookup,
    SecondaryLookup,
    /// Token generated on an earlier visit and read back from local storage
    StoredFallback,
    /// Token generated just now
    GeneratedFallback,
}

/// Token identifying a visitor for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorIdentifier {
    pub value: String,
    pub source: IdentitySource,
}

impl VisitorIdentifier {
    pub fn new(value: impl Into<String>, source: IdentitySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// True when the value is a real IP rather than a local token
    pub fn is_network_derived(&self) -> bool {
        matches!(
            self.source,
            IdentitySource::PrimaryLookup | IdentitySource::SecondaryLookup
        )
    }
}

impl std::fmt::Display for VisitorIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
