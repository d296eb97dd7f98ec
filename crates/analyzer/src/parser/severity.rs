//! Severity — keyword inference for titles that carry no severity prefix.

use crate::prompt::contract::Keywords;

use super::model::Severity;

/// Keyword sets in priority order; the first set with a hit wins.
const PRIORITY: [(Severity, &[&str]); 3] = [
    (Severity::Critical, Keywords::CRITICAL),
    (Severity::Warning, Keywords::WARNING),
    (Severity::Informational, Keywords::INFORMATIONAL),
];

/// Classify a title by case-sensitive keyword membership.
pub fn classify_title(title: &str) -> Severity {
    PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Unknown)
}
