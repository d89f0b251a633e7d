pub mod sim;

// Commonly used types, re-exported for callers
pub use sim::{
    agent::AgentConfiguration,
    client::{ClientConfig, ControllerState, ReplyKind, SendOutcome, SimulatorClient},
    conversation::{ConversationMessage, Sender, SimulatorListener},
    error::SimError,
    identity::{IdentityResolver, VisitorIdentifier},
    rate_limit::RateLimitLedger,
    reply::extract_reply_text,
    supabase::SupabaseConfig,
};
