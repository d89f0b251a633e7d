//! Visitor identity resolution
//!
//! Fallback chain: primary lookup → secondary lookup → stored token →
//! freshly generated token. Never fails.

use crate::sim::identity::api::IpLookupApi;
use crate::sim::identity::models::{IdentitySource, VisitorIdentifier};
use crate::sim::local_store::{LocalStore, KEY_VISITOR_ID};
use crate::sim::serialization::generate_fallback_visitor_id;
use tracing::{debug, error, info, warn};

pub struct IdentityResolver {
    api: IpLookupApi,
    store: LocalStore,
}

impl IdentityResolver {
    pub fn new(api: IpLookupApi, store: LocalStore) -> Self {
        Self { api, store }
    }

    /// Resolve the current visitor's identifier
    pub async fn resolve_visitor_identifier(&self) -> VisitorIdentifier {
        match self.api.lookup_primary().await {
            Ok(ip) => {
                info!("[Identity] ✅ resolved via primary lookup: {}", ip);
                return VisitorIdentifier::new(ip, IdentitySource::PrimaryLookup);
            }
            Err(e) => warn!("[Identity] primary lookup failed: {:#}", e),
        }

        match self.api.lookup_secondary().await {
            Ok(ip) => {
                info!("[Identity] ✅ resolved via secondary lookup: {}", ip);
                return VisitorIdentifier::new(ip, IdentitySource::SecondaryLookup);
            }
            Err(e) => warn!("[Identity] secondary lookup failed: {:#}", e),
        }

        self.local_fallback().await
    }

    async fn local_fallback(&self) -> VisitorIdentifier {
        match self.store.get(KEY_VISITOR_ID).await {
            Ok(Some(token)) if !token.is_empty() => {
                debug!("[Identity] using stored fallback token");
                return VisitorIdentifier::new(token, IdentitySource::StoredFallback);
            }
            Ok(_) => {}
            Err(e) => error!("[Identity] reading stored token failed: {:#}", e),
        }

        let token = generate_fallback_visitor_id();
        if let Err(e) = self.store.set(KEY_VISITOR_ID, &token).await {
            // still usable for this session, just not stable across visits
            error!("[Identity] persisting fallback token failed: {:#}", e);
        }
        info!("[Identity] 🆕 generated fallback token {}", token);
        VisitorIdentifier::new(token, IdentitySource::GeneratedFallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::local_store::tests::temp_store;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api_for(server: &MockServer) -> IpLookupApi {
        IpLookupApi::new(reqwest::Client::new(), server.url("/a"), server.url("/b"))
    }

    #[tokio::test]
    async fn primary_answer_wins_and_is_stable() {
        let server = MockServer::start_async().await;
        let primary = server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(200).json_body(json!({ "ip": "203.0.113.7" }));
            })
            .await;
        let secondary = server
            .mock_async(|when, then| {
                when.method(GET).path("/b");
                then.status(200).json_body(json!({ "ipAddress": "198.51.100.4" }));
            })
            .await;
        let (store, _dir) = temp_store().await;
        let resolver = IdentityResolver::new(api_for(&server), store.clone());

        let first = resolver.resolve_visitor_identifier().await;
        let second = resolver.resolve_visitor_identifier().await;

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "203.0.113.7");
        assert_eq!(first.source, IdentitySource::PrimaryLookup);
        primary.assert_hits_async(2).await;
        secondary.assert_hits_async(0).await;
        assert_eq!(store.get(KEY_VISITOR_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn falls_back_to_secondary() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(500);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/b");
                then.status(200).json_body(json!({ "ipAddress": "198.51.100.4" }));
            })
            .await;
        let (store, _dir) = temp_store().await;
        let resolver = IdentityResolver::new(api_for(&server), store);

        let id = resolver.resolve_visitor_identifier().await;
        assert_eq!(id.as_str(), "198.51.100.4");
        assert_eq!(id.source, IdentitySource::SecondaryLookup);
        assert!(id.is_network_derived());
    }

    #[tokio::test]
    async fn generates_then_reuses_local_token_when_offline() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(502);
            })
            .await;
        let (store, _dir) = temp_store().await;
        let resolver = IdentityResolver::new(api_for(&server), store.clone());

        let generated = resolver.resolve_visitor_identifier().await;
        assert_eq!(generated.source, IdentitySource::GeneratedFallback);
        assert!(generated.as_str().starts_with("visitor-"));
        assert_eq!(
            store.get(KEY_VISITOR_ID).await.unwrap().as_deref(),
            Some(generated.as_str())
        );

        let reused = resolver.resolve_visitor_identifier().await;
        assert_eq!(reused.source, IdentitySource::StoredFallback);
        assert_eq!(reused.value, generated.value);
    }

    #[tokio::test]
    async fn storage_failure_still_yields_fresh_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(502);
            })
            .await;
        // no migrations, so every read and write on local_storage fails
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = LocalStore::new(pool);
        assert!(store.get(KEY_VISITOR_ID).await.is_err());
        let resolver = IdentityResolver::new(api_for(&server), store);

        let first = resolver.resolve_visitor_identifier().await;
        let second = resolver.resolve_visitor_identifier().await;

        assert_eq!(first.source, IdentitySource::GeneratedFallback);
        assert!(first.as_str().starts_with("visitor-"));
        assert!(!first.is_network_derived());
        // nothing was persisted, so the next call generates again
        assert_eq!(second.source, IdentitySource::GeneratedFallback);
        assert_ne!(first.value, second.value);
    }
}
