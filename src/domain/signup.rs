//! Sign-up record types
//!
//! Sign-ups are created by an external form handler. Field names on disk are
//! owned by that writer, and any field this crate does not know about is kept
//! so that a full rewrite of the store never drops data.

use serde::{Deserialize, Serialize};

/// An inbound automation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignupRecord {
    pub id: String,

    /// Contact name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Organization name
    pub company: String,

    /// Free-text description of what should be automated
    pub challenge: String,

    pub status: SignupStatus,

    /// Fields written by the external producer that we pass through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Lifecycle of a sign-up. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupStatus {
    /// Waiting to be processed
    Pending,
    /// Solution delivered and contact notified
    Contacted,
}

impl SignupRecord {
    /// Create a new pending sign-up
    pub fn new(id: &str, name: &str, email: &str, company: &str, challenge: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            company: company.to_string(),
            challenge: challenge.to_string(),
            status: SignupStatus::Pending,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SignupStatus::Pending
    }

    /// Flip the record to `contacted`. There is no inverse.
    pub fn mark_contacted(&mut self) {
        self.status = SignupStatus::Contacted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_signup_is_pending() {
        let s = SignupRecord::new("1", "Ana", "ana@example.com", "Acme", "emails");
        assert!(s.is_pending());
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_mark_contacted() {
        let mut s = SignupRecord::new("1", "Ana", "ana@example.com", "Acme", "emails");
        s.mark_contacted();
        assert_eq!(s.status, SignupStatus::Contacted);
        assert!(!s.is_pending());

        // Idempotent
        s.mark_contacted();
        assert_eq!(s.status, SignupStatus::Contacted);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&SignupStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&SignupStatus::Contacted).unwrap(), "\"contacted\"");
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let raw = json!({
            "id": "42",
            "name": "Bruno",
            "email": "bruno@example.com",
            "company": "Bruno Tech LTDA",
            "challenge": "invoices by hand",
            "status": "pending",
            "createdAt": "2025-01-01T00:00:00Z",
            "source": "landing"
        });

        let record: SignupRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.extra.len(), 2);
        assert_eq!(record.extra["source"], json!("landing"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back, raw);
    }
}
