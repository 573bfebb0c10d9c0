//! Classification result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured judgment the classifier produces for one request.
///
/// Fields are private so a judgment cannot be altered after classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Judgment {
    category: Category,
    priority: u8,
    effort: Effort,
    integrations: Vec<String>,
    estimated_roi: String,
}

/// Kind of automation a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Email,
    DataEntry,
    Reporting,
    Workflow,
}

/// Rough effort bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Easy,
    Medium,
    Hard,
}

impl Judgment {
    /// Lowest and highest priority a judgment can carry
    pub const MIN_PRIORITY: u8 = 1;
    pub const MAX_PRIORITY: u8 = 5;

    pub fn new(
        category: Category,
        priority: u8,
        effort: Effort,
        integrations: Vec<String>,
        estimated_roi: String,
    ) -> Self {
        Self {
            category,
            priority: priority.clamp(Self::MIN_PRIORITY, Self::MAX_PRIORITY),
            effort,
            integrations,
            estimated_roi,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn effort(&self) -> Effort {
        self.effort
    }

    pub fn integrations(&self) -> &[String] {
        &self.integrations
    }

    pub fn estimated_roi(&self) -> &str {
        &self.estimated_roi
    }

    /// Copy of this judgment with extra integration targets prepended
    pub(crate) fn with_integrations_prefixed(&self, prefix: Vec<String>) -> Self {
        let mut integrations = prefix;
        integrations.extend(self.integrations.iter().cloned());
        Self {
            integrations,
            ..self.clone()
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Email => "email",
            Category::DataEntry => "data_entry",
            Category::Reporting => "reporting",
            Category::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Easy => "easy",
            Effort::Medium => "medium",
            Effort::Hard => "hard",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_clamped() {
        let high = Judgment::new(Category::Email, 9, Effort::Easy, vec![], String::new());
        assert_eq!(high.priority(), 5);
        let low = Judgment::new(Category::Email, 0, Effort::Easy, vec![], String::new());
        assert_eq!(low.priority(), 1);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::DataEntry).unwrap(), "\"data_entry\"");
        assert_eq!(serde_json::to_string(&Category::Workflow).unwrap(), "\"workflow\"");
        assert_eq!(Category::Reporting.to_string(), "reporting");
    }

    #[test]
    fn test_effort_serialization() {
        assert_eq!(serde_json::to_string(&Effort::Medium).unwrap(), "\"medium\"");
        assert_eq!(Effort::Hard.to_string(), "hard");
    }

    #[test]
    fn test_integrations_prefixed() {
        let j = Judgment::new(
            Category::Reporting,
            2,
            Effort::Easy,
            vec!["Automation".to_string()],
            "x".to_string(),
        );
        let j2 = j.with_integrations_prefixed(vec!["ERP".to_string()]);
        assert_eq!(j2.integrations(), ["ERP".to_string(), "Automation".to_string()]);
        assert_eq!(j2.category(), Category::Reporting);
        assert_eq!(j.integrations().len(), 1);
    }
}
