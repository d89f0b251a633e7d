use chrono::{DateTime, Local, TimeZone, Utc};

/// Per-send webhook session id, `test-session-<epoch millis>`
pub fn generate_session_id() -> String {
    format!("test-session-{}", Utc::now().timestamp_millis())
}

/// Message id: creation time in millis plus a per-session sequence number,
/// so two messages created in the same millisecond still differ.
pub fn generate_message_id(created_at: DateTime<Utc>, seq: u64) -> String {
    format!("{}-{}", created_at.timestamp_millis(), seq)
}

/// Display time for a chat bubble (`HH:MM`, local time)
pub fn display_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Namespaced random token used when neither IP lookup answers
pub fn generate_fallback_visitor_id() -> String {
    format!("visitor-{}", uuid::Uuid::new_v4().simple())
}
