//! Conversation module
//!
//! In-memory transcript of one simulator visit plus the callbacks the UI
//! registers to render it.

pub mod listener;
pub mod models;
pub mod session;

pub use listener::{EmptySimulatorListener, SimulatorListener};
pub use models::{ConversationMessage, Sender};
pub use session::ConversationSession;
