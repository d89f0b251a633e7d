//! Conversation session: ordered, append-only, never persisted

use crate::sim::conversation::models::{ConversationMessage, Sender, GREETING_TEXT};
use crate::sim::serialization::{display_timestamp, generate_message_id};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct ConversationSession {
    messages: Vec<ConversationMessage>,
    next_seq: u64,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// New session opened with the assistant greeting
    pub fn new() -> Self {
        let mut session = Self::empty();
        session.append(GREETING_TEXT, Sender::Assistant);
        session
    }

    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_seq: 0,
        }
    }

    /// Append a message; insertion order is display order
    pub fn append(&mut self, text: impl Into<String>, sender: Sender) -> ConversationMessage {
        let now = Utc::now();
        self.next_seq += 1;
        let message = ConversationMessage {
            id: generate_message_id(now, self.next_seq),
            text: text.into(),
            sender,
            timestamp: display_timestamp(&now),
        };
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Drop the transcript and start over from the greeting
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
