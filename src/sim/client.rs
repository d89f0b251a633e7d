//! Simulator controller
//!
//! Orchestrates identity, ledger, webhook and transcript for one visit.
//! `Idle` while nothing is outstanding, `Awaiting` while any reply is in
//! flight. Concurrent sends are allowed; replies land in completion order.

use crate::sim::agent::{AgentConfigService, AgentConfiguration, AgentDefaultsApi};
use crate::sim::conversation::{
    ConversationMessage, ConversationSession, EmptySimulatorListener, Sender, SimulatorListener,
};
use crate::sim::error::SimError;
use crate::sim::identity::models::{DEFAULT_PRIMARY_LOOKUP_URL, DEFAULT_SECONDARY_LOOKUP_URL};
use crate::sim::identity::{IdentityResolver, IpLookupApi, VisitorIdentifier};
use crate::sim::local_store::LocalStore;
use crate::sim::rate_limit::{
    LedgerStore, MemoryLedgerStore, RateLimitLedger, SupabaseLedgerApi, DEFAULT_MESSAGE_CEILING,
};
use crate::sim::reply::extract_reply_text;
use crate::sim::supabase::{build_supabase_client, SupabaseConfig};
use crate::sim::webhook::models::RATE_LIMIT_TEXT;
use crate::sim::webhook::{WebhookApi, CANNED_RESPONSES, WEBHOOK_ERROR_TEXT};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, error, info, warn};

/// Simulator configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// `None` runs offline: in-memory ledger, built-in agent defaults
    pub supabase: Option<SupabaseConfig>,
    /// Local SQLite storage, e.g. `sqlite://vlow_local.db?mode=rwc`
    pub local_db_url: String,
    pub ip_lookup_primary_url: String,
    pub ip_lookup_secondary_url: String,
    pub message_ceiling: i64,
    /// Pause before a canned reply
    pub simulated_reply_delay: Duration,
    /// Takes precedence over `site_settings.n8n_webhook_url`
    pub webhook_url_override: Option<String>,
}

impl ClientConfig {
    pub fn new(supabase: Option<SupabaseConfig>) -> Self {
        Self {
            supabase,
            local_db_url: "sqlite://vlow_local.db?mode=rwc".to_string(),
            ip_lookup_primary_url: DEFAULT_PRIMARY_LOOKUP_URL.to_string(),
            ip_lookup_secondary_url: DEFAULT_SECONDARY_LOOKUP_URL.to_string(),
            message_ceiling: DEFAULT_MESSAGE_CEILING,
            simulated_reply_delay: Duration::from_millis(1500),
            webhook_url_override: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Awaiting,
}

/// How a reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Webhook,
    Canned,
    WebhookError,
    RateLimited,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub visitor_message: ConversationMessage,
    pub reply: ConversationMessage,
    pub kind: ReplyKind,
}

/// Pre-built collaborators, for callers that wire things themselves
pub struct SimulatorParts {
    pub identity: IdentityResolver,
    pub ledger: RateLimitLedger,
    pub agent_service: AgentConfigService,
    pub agent: AgentConfiguration,
    pub http: reqwest::Client,
    pub simulated_reply_delay: Duration,
}

pub struct SimulatorClient {
    identity: IdentityResolver,
    ledger: RateLimitLedger,
    agent_service: AgentConfigService,
    agent: RwLock<AgentConfiguration>,
    webhook: Option<WebhookApi>,
    session: Mutex<ConversationSession>,
    visitor: OnceCell<VisitorIdentifier>,
    in_flight: AtomicUsize,
    listener: Arc<dyn SimulatorListener>,
    simulated_reply_delay: Duration,
}

impl SimulatorClient {
    /// Build every collaborator from `config` and load the agent configuration
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!(
            "[Simulator] 🚀 starting, local storage: {}, supabase: {}",
            config.local_db_url,
            config.supabase.as_ref().map(|s| s.url.as_str()).unwrap_or("offline")
        );

        let store = LocalStore::open(&config.local_db_url).await?;
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        let (ledger_store, defaults_api): (Arc<dyn LedgerStore>, Option<AgentDefaultsApi>) =
            match &config.supabase {
                Some(supabase) => {
                    let client = build_supabase_client(supabase)?;
                    (
                        Arc::new(SupabaseLedgerApi::new(client.clone(), supabase)),
                        Some(AgentDefaultsApi::new(client, supabase)),
                    )
                }
                None => {
                    warn!("[Simulator] no Supabase project configured, ledger kept in memory");
                    (Arc::new(MemoryLedgerStore::new()), None)
                }
            };

        let identity = IdentityResolver::new(
            IpLookupApi::new(
                http.clone(),
                config.ip_lookup_primary_url.clone(),
                config.ip_lookup_secondary_url.clone(),
            ),
            store.clone(),
        );
        let ledger = RateLimitLedger::with_ceiling(ledger_store, config.message_ceiling);
        let agent_service = AgentConfigService::new(defaults_api, store);

        let mut agent = agent_service.load().await;
        if let Some(url) = config.webhook_url_override.clone() {
            agent.webhook_url = Some(url);
        }

        Ok(Self::from_parts(SimulatorParts {
            identity,
            ledger,
            agent_service,
            agent,
            http,
            simulated_reply_delay: config.simulated_reply_delay,
        }))
    }

    pub fn from_parts(parts: SimulatorParts) -> Self {
        let webhook = parts
            .agent
            .webhook_url
            .clone()
            .map(|url| WebhookApi::new(parts.http.clone(), url));

        Self {
            identity: parts.identity,
            ledger: parts.ledger,
            agent_service: parts.agent_service,
            agent: RwLock::new(parts.agent),
            webhook,
            session: Mutex::new(ConversationSession::new()),
            visitor: OnceCell::new(),
            in_flight: AtomicUsize::new(0),
            listener: Arc::new(EmptySimulatorListener),
            simulated_reply_delay: parts.simulated_reply_delay,
        }
    }

    /// Register the listener
    pub fn set_listener(&mut self, listener: Arc<dyn SimulatorListener>) {
        self.listener = listener;
    }

    pub fn state(&self) -> ControllerState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            ControllerState::Awaiting
        } else {
            ControllerState::Idle
        }
    }

    /// Snapshot of the transcript
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.session.lock().await.messages().to_vec()
    }

    pub async fn agent_config(&self) -> AgentConfiguration {
        self.agent.read().await.clone()
    }

    /// Resolved once per session, then reused
    pub async fn visitor_identifier(&self) -> &VisitorIdentifier {
        self.visitor
            .get_or_init(|| async {
                let visitor = self.identity.resolve_visitor_identifier().await;
                if !visitor.is_network_derived() {
                    warn!("[Simulator] no public IP, limiting on local token {}", visitor);
                }
                visitor
            })
            .await
    }

    /// Submit a visitor message and wait for its reply.
    ///
    /// Blank input is rejected without side effects. Every other failure
    /// ends up as a reply bubble, never as an error.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome, SimError> {
        if text.trim().is_empty() {
            debug!("[Simulator] blank message rejected");
            return Err(SimError::EmptyMessage);
        }

        let visitor_message = self.append(text, Sender::Visitor).await;
        self.begin_awaiting().await;

        let (reply_text, kind) = self.produce_reply(text).await;

        let reply = self.append(&reply_text, Sender::Assistant).await;
        self.finish_awaiting().await;

        info!("[Simulator] 💬 reply ready ({:?})", kind);
        Ok(SendOutcome {
            visitor_message,
            reply,
            kind,
        })
    }

    async fn produce_reply(&self, text: &str) -> (String, ReplyKind) {
        let visitor = self.visitor_identifier().await;
        if !self.ledger.check_and_increment(visitor.as_str()).await {
            self.listener
                .on_rate_limit_reached(visitor.value.clone())
                .await;
            return (RATE_LIMIT_TEXT.to_string(), ReplyKind::RateLimited);
        }

        let Some(webhook) = &self.webhook else {
            tokio::time::sleep(self.simulated_reply_delay).await;
            return (canned_reply().to_string(), ReplyKind::Canned);
        };

        let system_prompt = self.agent.read().await.system_prompt.clone();
        match webhook.post_message(text, &system_prompt).await {
            Ok(payload) => (extract_reply_text(&payload), ReplyKind::Webhook),
            Err(e) => {
                error!("[Simulator] webhook call failed: {:#}", e);
                (WEBHOOK_ERROR_TEXT.to_string(), ReplyKind::WebhookError)
            }
        }
    }

    /// Persist a new prompt (and optionally display name), then restart the
    /// conversation so the new persona starts clean.
    pub async fn update_agent_config(
        &self,
        system_prompt: &str,
        display_name: Option<&str>,
    ) -> Result<()> {
        self.agent_service
            .save_override(system_prompt, display_name)
            .await?;

        {
            let mut agent = self.agent.write().await;
            agent.system_prompt = system_prompt.to_string();
            if let Some(name) = display_name {
                agent.display_name = name.to_string();
            }
        }

        let greeting = {
            let mut session = self.session.lock().await;
            session.reset();
            session.last().cloned()
        };
        if let Some(greeting) = greeting {
            self.notify_appended(&greeting).await;
        }
        Ok(())
    }

    async fn append(&self, text: &str, sender: Sender) -> ConversationMessage {
        let message = self.session.lock().await.append(text, sender);
        self.notify_appended(&message).await;
        message
    }

    async fn notify_appended(&self, message: &ConversationMessage) {
        if let Ok(json) = serde_json::to_string(message) {
            self.listener.on_message_appended(json).await;
        }
    }

    async fn begin_awaiting(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.listener.on_typing_changed(true).await;
        }
    }

    async fn finish_awaiting(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.listener.on_typing_changed(false).await;
        }
    }
}

fn canned_reply() -> &'static str {
    CANNED_RESPONSES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CANNED_RESPONSES[0])
}
