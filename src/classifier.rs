//! Keyword heuristic that turns a free-text request into a `Judgment`.
//!
//! Matching is case-insensitive substring search. Keyword lists carry both the
//! Portuguese and English spellings that show up in the sign-up form.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Category, Effort, Judgment, SignupRecord};

/// Category rules, checked in order; the first rule with a hit wins.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Email, &["email", "mail"]),
    (
        Category::DataEntry,
        &["data", "entrada", "entry", "digit", "nfe", "invoice", "nota"],
    ),
    (Category::Reporting, &["report", "relat"]),
    (Category::Workflow, &["workflow", "processo", "fluxo"]),
];

const URGENCY_KEYWORDS: &[&str] = &["urgente", "urgent", "crítico", "critical", "hoje", "today", "asap"];

const BASE_PRIORITY: u8 = 2;

/// Word counts below these bounds map to easy / medium
const EASY_WORD_LIMIT: usize = 20;
const MEDIUM_WORD_LIMIT: usize = 50;

pub const DEFAULT_ROI: &str = "20+ hours/month saved";

static HOURS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:horas?|hours?|hrs?)\b").expect("hours pattern is valid")
});

/// Classify a request text. Never fails; empty input yields the defaults.
pub fn classify(text: &str) -> Judgment {
    let lowered = text.to_lowercase();
    Judgment::new(
        detect_category(&lowered),
        calculate_priority(&lowered),
        estimate_effort(text),
        vec!["Automation".to_string()],
        estimate_roi(text),
    )
}

/// Classify a sign-up, adding integration targets derived from the organization name.
pub fn classify_signup(signup: &SignupRecord) -> Judgment {
    let judgment = classify(&signup.challenge);
    let company = signup.company.to_lowercase();

    let mut extra = Vec::new();
    if company.contains("ltda") {
        extra.push("ERP".to_string());
    }
    if company.contains("tech") {
        extra.push("API".to_string());
    }

    if extra.is_empty() {
        judgment
    } else {
        judgment.with_integrations_prefixed(extra)
    }
}

fn detect_category(lowered: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| lowered.contains(t)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Workflow)
}

fn calculate_priority(lowered: &str) -> u8 {
    let hits = URGENCY_KEYWORDS.iter().filter(|k| lowered.contains(*k)).count();
    let raw = (BASE_PRIORITY as usize).saturating_add(hits);
    raw.min(Judgment::MAX_PRIORITY as usize) as u8
}

fn estimate_effort(text: &str) -> Effort {
    match text.split_whitespace().count() {
        n if n < EASY_WORD_LIMIT => Effort::Easy,
        n if n < MEDIUM_WORD_LIMIT => Effort::Medium,
        _ => Effort::Hard,
    }
}

fn estimate_roi(text: &str) -> String {
    // ASCII digits only; the first count that fits a u64 wins
    HOURS_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| m.as_str().parse::<u64>().ok())
        .map(|hours| format!("{} hours/month saved", hours))
        .unwrap_or_else(|| DEFAULT_ROI.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_empty_input_defaults() {
        let j = classify("");
        assert_eq!(j.category(), Category::Workflow);
        assert_eq!(j.priority(), 2);
        assert_eq!(j.effort(), Effort::Easy);
        assert_eq!(j.estimated_roi(), DEFAULT_ROI);
        assert_eq!(j.integrations(), ["Automation".to_string()]);
    }

    #[test]
    fn test_email_wins_over_everything() {
        let texts = [
            "send email with the monthly report",
            "Invoice data entry then MAIL the workflow owner",
            "relatório de processo por e-mail",
            "gmail",
        ];
        for t in texts {
            assert_eq!(classify(t).category(), Category::Email, "text: {t}");
        }
    }

    #[test]
    fn test_data_entry_terms() {
        assert_eq!(classify("Digitação de NFe").category(), Category::DataEntry);
        assert_eq!(classify("we type every invoice manually").category(), Category::DataEntry);
        assert_eq!(classify("entrada de pedidos").category(), Category::DataEntry);
    }

    #[test]
    fn test_reporting_before_workflow() {
        assert_eq!(classify("weekly report for the workflow team").category(), Category::Reporting);
        assert_eq!(classify("Relatórios semanais").category(), Category::Reporting);
    }

    #[test]
    fn test_workflow_terms_and_fallback() {
        assert_eq!(classify("fluxo de aprovação").category(), Category::Workflow);
        assert_eq!(classify("something else entirely").category(), Category::Workflow);
    }

    #[test]
    fn test_priority_counts_distinct_keywords() {
        assert_eq!(classify("nothing pressing").priority(), 2);
        assert_eq!(classify("this is CRITICAL").priority(), 3);
        // "urgente" also contains "urgent"
        assert_eq!(classify("urgente").priority(), 4);
        // Repeating a keyword does not count twice
        assert_eq!(classify("critical critical critical").priority(), 3);
    }

    #[test]
    fn test_priority_capped_at_five() {
        let j = classify("urgente critical crítico hoje today asap");
        assert_eq!(j.priority(), 5);
    }

    #[test]
    fn test_priority_monotonic_in_keyword_count() {
        let mut text = String::from("request");
        let mut last = classify(&text).priority();
        for k in URGENCY_KEYWORDS {
            text.push(' ');
            text.push_str(k);
            let p = classify(&text).priority();
            assert!(p >= last);
            assert!((2..=5).contains(&p));
            last = p;
        }
    }

    #[test]
    fn test_effort_boundaries() {
        assert_eq!(classify(&words(19)).effort(), Effort::Easy);
        assert_eq!(classify(&words(20)).effort(), Effort::Medium);
        assert_eq!(classify(&words(49)).effort(), Effort::Medium);
        assert_eq!(classify(&words(50)).effort(), Effort::Hard);
    }

    #[test]
    fn test_effort_ignores_repeated_whitespace() {
        let text = format!("  {}  ", vec!["a"; 19].join("   \n"));
        assert_eq!(classify(&text).effort(), Effort::Easy);
    }

    #[test]
    fn test_roi_from_hours() {
        assert_eq!(classify("gasto 40 horas por mês").estimated_roi(), "40 hours/month saved");
        assert_eq!(classify("about 12hrs a week").estimated_roi(), "12 hours/month saved");
        assert_eq!(classify("takes 1 hour").estimated_roi(), "1 hours/month saved");
        assert_eq!(classify("8 HORAS").estimated_roi(), "8 hours/month saved");
    }

    #[test]
    fn test_roi_ignores_non_ascii_digits() {
        assert_eq!(classify("٤٠ horas, depois 12 horas").estimated_roi(), "12 hours/month saved");
        assert_eq!(classify("४० hours").estimated_roi(), DEFAULT_ROI);
        assert_eq!(
            classify("99999999999999999999999 hours, realistically 30 hours").estimated_roi(),
            "30 hours/month saved"
        );
    }

    #[test]
    fn test_roi_default_without_hours() {
        assert_eq!(classify("takes forever").estimated_roi(), DEFAULT_ROI);
        assert_eq!(classify("40 minutes").estimated_roi(), DEFAULT_ROI);
    }

    #[test]
    fn test_classify_signup_integrations() {
        let s = SignupRecord::new("1", "Ana", "a@x.com", "Nova Tech LTDA", "emails");
        let j = classify_signup(&s);
        assert_eq!(
            j.integrations(),
            ["ERP".to_string(), "API".to_string(), "Automation".to_string()]
        );

        let plain = SignupRecord::new("2", "Bo", "b@x.com", "Bakery", "emails");
        assert_eq!(classify_signup(&plain).integrations(), ["Automation".to_string()]);
    }
}
