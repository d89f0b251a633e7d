//! Reply extraction from webhook payloads.
//!
//! The webhook has no fixed schema. We check a fixed list of field names in
//! order, fall back to the payload itself, and rewrite the "Workflow was
//! started" acknowledgement into an operator hint.

use serde_json::Value;

/// Candidate reply fields, highest priority first
pub const REPLY_FIELDS: [&str; 4] = ["output", "text", "message", "content"];

/// What a fire-and-forget workflow answers instead of a reply
pub const WORKFLOW_STARTED_SENTINEL: &str = "Workflow was started";

/// Shown in place of the sentinel
pub const WORKFLOW_STARTED_WARNING: &str = "⚠️ Workflow started but no response returned. Please add a 'Respond to Webhook' node in n8n or set Webhook to 'Respond: Using Last Node'.";

/// Resolve a human-readable reply from an arbitrary webhook payload. Never fails.
pub fn extract_reply_text(raw_payload: &Value) -> String {
    let working = match raw_payload {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };

    let text = first_candidate_field(working).unwrap_or_else(|| match working {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    if text == WORKFLOW_STARTED_SENTINEL {
        return WORKFLOW_STARTED_WARNING.to_string();
    }
    text
}

/// First candidate field holding a non-empty string
fn first_candidate_field(working: &Value) -> Option<String> {
    let object = working.as_object()?;
    REPLY_FIELDS.iter().find_map(|field| match object.get(*field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}
