//! Rate limit ledger models

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Messages allowed per visitor identifier
pub const DEFAULT_MESSAGE_CEILING: i64 = 15;

/// Table holding one row per visitor identifier
pub const SIMULATOR_LOGS_TABLE: &str = "simulator_logs";

/// One `simulator_logs` row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateLimitRecord {
    pub id: i64,
    pub ip_address: String,
    pub message_count: i64,
    #[serde(default, deserialize_with = "deserialize_timestamp_or_null")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// Accepts `timestamptz` (RFC 3339) as well as bare `timestamp` columns,
/// which PostgREST renders without an offset; those are taken as UTC.
/// Anything unparseable becomes `None` rather than failing the whole row.
pub(crate) fn deserialize_timestamp_or_null<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

/// Outcome of a check-and-increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// First message from this identifier, record created with count 1
    Created,
    /// Count incremented to `count`
    Incremented { count: i64 },
    /// Ceiling reached, record left as is
    Blocked { count: i64 },
    /// Empty identifier, storage not consulted
    Unidentified,
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateLimitDecision::Blocked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rows_with_either_timestamp_flavour() {
        let with_offset: RateLimitRecord = serde_json::from_value(json!({
            "id": 3,
            "ip_address": "203.0.113.7",
            "message_count": 4,
            "last_activity": "2025-03-01T08:30:00.123456+00:00"
        }))
        .unwrap();
        let naive: RateLimitRecord = serde_json::from_value(json!({
            "id": 3,
            "ip_address": "203.0.113.7",
            "message_count": 4,
            "last_activity": "2025-03-01T08:30:00.123456"
        }))
        .unwrap();
        assert_eq!(with_offset.last_activity, naive.last_activity);
        assert!(with_offset.last_activity.is_some());
    }

    #[test]
    fn missing_or_garbage_timestamp_is_none() {
        let missing: RateLimitRecord = serde_json::from_value(json!({
            "id": 1, "ip_address": "x", "message_count": 1
        }))
        .unwrap();
        let garbage: RateLimitRecord = serde_json::from_value(json!({
            "id": 1, "ip_address": "x", "message_count": 1, "last_activity": "yesterday"
        }))
        .unwrap();
        assert_eq!(missing.last_activity, None);
        assert_eq!(garbage.last_activity, None);
    }

    #[test]
    fn only_blocked_is_disallowed() {
        assert!(RateLimitDecision::Created.is_allowed());
        assert!(RateLimitDecision::Unidentified.is_allowed());
        assert!(RateLimitDecision::Incremented { count: 15 }.is_allowed());
        assert!(!RateLimitDecision::Blocked { count: 15 }.is_allowed());
    }
}
