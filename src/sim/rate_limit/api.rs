//! `simulator_logs` over Supabase PostgREST

use crate::sim::error::SimError;
use crate::sim::rate_limit::models::{RateLimitRecord, SIMULATOR_LOGS_TABLE};
use crate::sim::rate_limit::store::LedgerStore;
use crate::sim::supabase::SupabaseConfig;
use crate::sim::types::{expect_success, handle_http_response, PostgrestError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::{debug, info};

/// Ask PostgREST for a single object instead of an array
const PGRST_SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

pub struct SupabaseLedgerApi {
    client: reqwest::Client,
    table_url: String,
}

impl SupabaseLedgerApi {
    /// `client` must already carry the Supabase auth headers
    pub fn new(client: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            table_url: config.table_url(SIMULATOR_LOGS_TABLE),
        }
    }
}

#[async_trait]
impl LedgerStore for SupabaseLedgerApi {
    async fn find_by_ip(&self, ip_address: &str) -> Result<Option<RateLimitRecord>> {
        debug!("[LedgerAPI] 📡 lookup {}", ip_address);

        let response = self
            .client
            .get(&self.table_url)
            .header(ACCEPT, PGRST_SINGLE_OBJECT)
            .query(&[
                ("ip_address", format!("eq.{}", ip_address)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .context("ledger lookup request failed")?;

        // single-object mode answers 406 + PGRST116 when no row matches
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            let body = response
                .bytes()
                .await
                .context("failed to read ledger lookup body")?;
            if PostgrestError::parse(&body).is_some_and(|e| e.is_row_not_found()) {
                debug!("[LedgerAPI] no row for {}", ip_address);
                return Ok(None);
            }
            return Err(SimError::Http {
                status: StatusCode::NOT_ACCEPTABLE.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        let record: RateLimitRecord = handle_http_response(response, "ledger lookup").await?;
        Ok(Some(record))
    }

    async fn insert_first(&self, ip_address: &str) -> Result<()> {
        info!("[LedgerAPI] ➕ first message from {}", ip_address);

        let response = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!([{
                "ip_address": ip_address,
                "message_count": 1,
            }]))
            .send()
            .await
            .context("ledger insert request failed")?;

        expect_success(response, "ledger insert").await
    }

    async fn update_count(
        &self,
        id: i64,
        message_count: i64,
        last_activity: DateTime<Utc>,
    ) -> Result<()> {
        debug!("[LedgerAPI] ✏️ row {} -> count {}", id, message_count);

        let response = self
            .client
            .patch(&self.table_url)
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{}", id))])
            .json(&serde_json::json!({
                "message_count": message_count,
                "last_activity": last_activity.to_rfc3339_opts(SecondsFormat::Millis, true),
            }))
            .send()
            .await
            .context("ledger update request failed")?;

        expect_success(response, "ledger update").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    fn api_for(server: &MockServer) -> SupabaseLedgerApi {
        let config = SupabaseConfig::new(server.base_url(), "anon-key");
        let client = crate::sim::supabase::build_supabase_client(&config).unwrap();
        SupabaseLedgerApi::new(client, &config)
    }

    #[tokio::test]
    async fn lookup_returns_row() {
        let server = MockServer::start_async().await;
        let lookup = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/simulator_logs")
                    .query_param("ip_address", "eq.203.0.113.7")
                    .query_param("select", "*")
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer anon-key")
                    .header("accept", PGRST_SINGLE_OBJECT);
                then.status(200).json_body(json!({
                    "id": 9,
                    "ip_address": "203.0.113.7",
                    "message_count": 4,
                    "last_activity": "2025-03-01T08:30:00+00:00"
                }));
            })
            .await;

        let record = api_for(&server)
            .find_by_ip("203.0.113.7")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, 9);
        assert_eq!(record.message_count, 4);
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn row_not_found_maps_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/simulator_logs");
                then.status(406).json_body(json!({
                    "code": "PGRST116",
                    "details": "The result contains 0 rows",
                    "hint": null,
                    "message": "JSON object requested, multiple (or no) rows returned"
                }));
            })
            .await;

        assert_eq!(api_for(&server).find_by_ip("10.0.0.1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn other_errors_propagate() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/simulator_logs");
                then.status(401).json_body(json!({ "message": "Invalid API key" }));
            })
            .await;

        let err = api_for(&server).find_by_ip("10.0.0.1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::Http { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn insert_and_update_send_expected_bodies() {
        let server = MockServer::start_async().await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/simulator_logs")
                    .json_body(json!([{ "ip_address": "10.0.0.1", "message_count": 1 }]));
                then.status(201);
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/rest/v1/simulator_logs")
                    .query_param("id", "eq.9")
                    .body_contains("\"message_count\":5")
                    .body_contains("\"last_activity\":\"2025-03-01T08:30:00.000Z\"");
                then.status(204);
            })
            .await;

        let api = api_for(&server);
        api.insert_first("10.0.0.1").await.unwrap();
        let at = DateTime::parse_from_rfc3339("2025-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        api.update_count(9, 5, at).await.unwrap();

        insert.assert_async().await;
        update.assert_async().await;
    }
}
