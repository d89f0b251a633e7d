pub mod agent;
pub mod client;
pub mod conversation;
pub mod db;
pub mod error;
pub mod identity;
pub mod local_store;
pub mod rate_limit;
pub mod reply;
pub mod serialization;
pub mod supabase;
pub mod types;
pub mod webhook;

pub use client::{ClientConfig, ControllerState, ReplyKind, SendOutcome, SimulatorClient};
pub use error::SimError;
