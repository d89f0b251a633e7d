//! Conversation models

use serde::{Deserialize, Serialize};

/// Opening line of every session
pub const GREETING_TEXT: &str =
    "Halo! 👋 Saya Vlow AI Assistant. Ada yang bisa saya bantu untuk bisnis kamu hari ini?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    Visitor,
    #[serde(rename = "bot")]
    Assistant,
}

/// One chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique within the session, derived from creation time
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Display time, `HH:MM`
    pub timestamp: String,
}
