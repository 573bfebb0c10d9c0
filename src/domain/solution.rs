//! Solution record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::judgment::Judgment;

/// Metadata for one generated automation, keyed by its sign-up in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionRecord {
    /// Unique per generation (see `id::generate_solution_id`)
    pub id: String,

    /// Sign-up this solution was generated for
    pub signup_id: String,

    pub judgment: Judgment,

    /// Where the generated stub was written
    pub artifact_path: PathBuf,

    pub status: SolutionStatus,

    pub created_at: DateTime<Utc>,

    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    Created,
    Delivered,
}

impl SolutionRecord {
    pub fn new(id: String, signup_id: &str, judgment: Judgment, artifact_path: PathBuf) -> Self {
        Self {
            id,
            signup_id: signup_id.to_string(),
            judgment,
            artifact_path,
            status: SolutionStatus::Created,
            created_at: Utc::now(),
            delivered_at: None,
        }
    }

    pub fn mark_delivered(&mut self) {
        self.status = SolutionStatus::Delivered;
        self.delivered_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Effort};

    fn judgment() -> Judgment {
        Judgment::new(Category::Email, 3, Effort::Easy, vec!["Automation".into()], "5 hours/month saved".into())
    }

    #[test]
    fn test_new_solution_is_created() {
        let s = SolutionRecord::new("sol-1".into(), "insc-1", judgment(), PathBuf::from("/tmp/sol-1.rs"));
        assert_eq!(s.status, SolutionStatus::Created);
        assert!(s.delivered_at.is_none());
        assert_eq!(s.signup_id, "insc-1");
    }

    #[test]
    fn test_mark_delivered_sets_timestamp() {
        let mut s = SolutionRecord::new("sol-1".into(), "insc-1", judgment(), PathBuf::from("/tmp/sol-1.rs"));
        s.mark_delivered();
        assert_eq!(s.status, SolutionStatus::Delivered);
        let at = s.delivered_at.unwrap();
        assert!(at >= s.created_at);
    }

    #[test]
    fn test_serialization_roundtrip_keeps_judgment() {
        let s = SolutionRecord::new("sol-1".into(), "insc-1", judgment(), PathBuf::from("/tmp/sol-1.rs"));
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"status\":\"created\""));
        let back: SolutionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
