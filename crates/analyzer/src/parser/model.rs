use serde::{Deserialize, Serialize};

use crate::prompt::contract::SEVERITY_LABELS;

/// Coarse triage label attached to each extracted issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Informational,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => SEVERITY_LABELS[0],
            Severity::Warning => SEVERITY_LABELS[1],
            Severity::Informational => SEVERITY_LABELS[2],
            Severity::Unknown => "Unknown",
        }
    }

    /// Match a declared severity label, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything that is not one of the contract labels
    /// (or its common short form), including `"Unknown"`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" => Some(Severity::Critical),
            "warning" | "warn" => Some(Severity::Warning),
            "informational" | "info" => Some(Severity::Informational),
            _ => None,
        }
    }

    /// Find a full severity label among the words of a declared prefix,
    /// as in `Critical Issue` or `Severity Warning`.
    ///
    /// Short forms are not accepted here; `Info Leak` is a title, not a label.
    pub fn find_label(declared: &str) -> Option<Self> {
        declared
            .split(|c: char| !c.is_alphanumeric())
            .find(|word| SEVERITY_LABELS.iter().any(|label| label.eq_ignore_ascii_case(word)))
            .and_then(Self::from_label)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted issue.
///
/// Only the response parser builds these; everything else reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    #[serde(rename = "Issue Name")]
    title: String,
    #[serde(rename = "Analysis")]
    analysis: String,
    #[serde(rename = "Severity")]
    severity: Severity,
}

impl Issue {
    pub(crate) fn new(title: String, analysis: String, severity: Severity) -> Self {
        Self {
            title,
            analysis,
            severity,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Ordered issues extracted from one oracle reply. Serializes as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnalysisTable {
    issues: Vec<Issue>,
}

impl AnalysisTable {
    pub(crate) fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    /// Number of issues at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

impl IntoIterator for AnalysisTable {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a AnalysisTable {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_case_insensitive() {
        assert_eq!(Severity::from_label(" critical "), Some(Severity::Critical));
        assert_eq!(Severity::from_label("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::from_label("Info"), Some(Severity::Informational));
        assert_eq!(Severity::from_label("Unknown"), None);
        assert_eq!(Severity::from_label("SSH"), None);
    }

    #[test]
    fn test_find_label_in_declared_prefix() {
        assert_eq!(Severity::find_label("Critical Issue"), Some(Severity::Critical));
        assert_eq!(Severity::find_label("Severity Warning"), Some(Severity::Warning));
        assert_eq!(Severity::find_label("[informational]"), Some(Severity::Informational));
        assert_eq!(Severity::find_label("Info Leak"), None);
        assert_eq!(Severity::find_label("SSH"), None);
        assert_eq!(Severity::find_label(""), None);
    }

    #[test]
    fn test_issue_serializes_with_display_keys() {
        let issue = Issue::new(
            "Disk Failure".to_string(),
            "sda is dying".to_string(),
            Severity::Critical,
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Issue Name": "Disk Failure",
                "Analysis": "sda is dying",
                "Severity": "Critical",
            })
        );
    }

    #[test]
    fn test_table_serializes_as_array() {
        let table = AnalysisTable::new(vec![
            Issue::new("a".into(), "x".into(), Severity::Warning),
            Issue::new("b".into(), "y".into(), Severity::Unknown),
        ]);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(table.count(Severity::Warning), 1);
        assert_eq!(table.count(Severity::Critical), 0);
    }

    #[test]
    fn test_empty_table_serializes_as_empty_array() {
        let json = serde_json::to_string(&AnalysisTable::default()).unwrap();
        assert_eq!(json, "[]");
    }
}
