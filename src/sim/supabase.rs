//! Supabase (PostgREST) connection settings and the shared HTTP client.
//!
//! The client is built once from [`SupabaseConfig`] and handed to every API
//! that talks to the project; auth headers ride along as default headers.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// `<url>/rest/v1/<table>`
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }
}

/// HTTP client with `apikey` and bearer auth attached to every request
pub fn build_supabase_client(config: &SupabaseConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("apikey"),
        HeaderValue::from_str(&config.anon_key).context("invalid Supabase anon key")?,
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .context("invalid Supabase anon key")?,
    );

    reqwest::ClientBuilder::new()
        .default_headers(headers)
        .build()
        .context("failed to build Supabase HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let a = SupabaseConfig::new("https://demo.supabase.co/", "k");
        let b = SupabaseConfig::new("https://demo.supabase.co", "k");
        assert_eq!(a.table_url("simulator_logs"), b.table_url("simulator_logs"));
        assert_eq!(
            a.table_url("simulator_logs"),
            "https://demo.supabase.co/rest/v1/simulator_logs"
        );
    }

    #[test]
    fn rejects_key_with_newline() {
        let config = SupabaseConfig::new("https://demo.supabase.co", "bad\nkey");
        assert!(build_supabase_client(&config).is_err());
    }
}
