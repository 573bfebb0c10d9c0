//! Queue and outbound line types.
//!
//! Both logs are JSONL: one of these structs per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the notification queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Rendered message body
    pub message: String,

    pub sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Delivery,
}

impl NotificationEvent {
    /// Create an unsent delivery event
    pub fn delivery(message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: EventKind::Delivery,
            message,
            sent: false,
        }
    }
}

/// One line of the outbound file, waiting for whatever actually talks to the chat channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    pub timestamp: DateTime<Utc>,
    pub to: String,
    pub message: String,
    pub status: OutboundStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundStatus {
    Pending,
}

impl OutboundMessage {
    pub fn pending(to: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            to: to.to_string(),
            message: message.to_string(),
            status: OutboundStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_event_is_unsent() {
        let e = NotificationEvent::delivery("hello".into());
        assert!(!e.sent);
        assert_eq!(e.kind, EventKind::Delivery);
    }

    #[test]
    fn test_event_wire_format() {
        let e = NotificationEvent::delivery("hello".into());
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "delivery");
        assert_eq!(v["sent"], false);
        assert_eq!(v["message"], "hello");
        assert!(v["timestamp"].is_string());
    }

    #[test]
    fn test_event_parses_legacy_line() {
        let line = r#"{"timestamp":"2025-02-01T10:00:00.000Z","type":"delivery","message":"hi","sent":false}"#;
        let e: NotificationEvent = serde_json::from_str(line).unwrap();
        assert_eq!(e.message, "hi");
        assert!(!e.sent);
    }

    #[test]
    fn test_outbound_wire_format() {
        let m = OutboundMessage::pending("@ops", "hi");
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["to"], "@ops");
        assert_eq!(v["status"], "pending");
    }
}
