//! Contract — the reply format agreed between the prompt and the parser.
//!
//! The instruction text sent to the oracle and the grammar used to read its
//! reply are both derived from the items below. Changing one without the
//! other breaks extraction, so they live together.

/// Bumped whenever the instruction wording or the entry grammar changes.
pub const CONTRACT_VERSION: u32 = 1;

/// Upper bound on entries the oracle is asked to produce.
pub const MAX_ISSUES: usize = 7;

/// Lower bound on entries the oracle is asked to produce.
pub const MIN_ISSUES: usize = 5;

/// Severity labels the oracle is asked to prefix titles with, highest first.
pub const SEVERITY_LABELS: [&str; 3] = ["Critical", "Warning", "Informational"];

/// Entry header: `<number>. **<title>**:` with the title kept on one line.
///
/// Also accepts `**<title>** :` and `**<title>:**`, which models emit often
/// enough. Group 1 is the raw title, which may carry a `Severity:` prefix.
pub const ENTRY_HEADER_PATTERN: &str = r"\d+\.[ \t]+\*\*([^\n]*?)(?:\*\*[ \t]*:|:\*\*)";

/// Title keywords used when the oracle leaves out the severity prefix.
pub struct Keywords;

impl Keywords {
    pub const CRITICAL: &'static [&'static str] =
        &["Corruption", "Failure", "Timeout", "Crash", "Unresponsive"];

    pub const WARNING: &'static [&'static str] =
        &["Lost", "Errors", "Restart", "Repeated", "High Usage"];

    pub const INFORMATIONAL: &'static [&'static str] = &["Activation", "Log", "Monitor"];
}

/// Example entries shown to the oracle, one per severity label.
const EXAMPLES: [(&str, &str, &str); 3] = [
    ("Critical", "Kernel Panic Detected", "Details about the kernel panic..."),
    ("Warning", "Repeated Authentication Failures", "Analysis of failed logins..."),
    ("Informational", "System Updates Applied", "Details about updates..."),
];

/// Render one entry in the exact shape [`ENTRY_HEADER_PATTERN`] accepts.
pub fn format_entry(number: usize, severity: &str, title: &str, analysis: &str) -> String {
    format!("{}. **{}: {}**: {}", number, severity, title, analysis)
}

/// Build the system instruction sent with every request.
pub fn instructions() -> String {
    let examples = EXAMPLES
        .iter()
        .enumerate()
        .map(|(i, (severity, title, analysis))| format_entry(i + 1, severity, title, analysis))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert system log analyst. Analyze the provided syslog entries to identify \
unusual patterns, errors, and security threats.

INSTRUCTIONS:
1. Structure your response STRICTLY as a numbered list of issues.
2. For each issue, format as: \"**{{SEVERITY}}: {{ISSUE TITLE}}**: {{DETAILED ANALYSIS}}\"
3. Always use the same format with a number, followed by bold issue title, colon, then analysis.
4. Each issue must have a clear, concise title that describes the problem.
5. Categorize issues by severity in your titles using exactly one of these terms:
   - {critical}: for system failures, crashes, corruption
   - {warning}: for errors, timeouts, repeated issues
   - {informational}: for routine activities
6. Limit your response to the {min}-{max} most important issues.

Example format:
{examples}
",
        critical = SEVERITY_LABELS[0],
        warning = SEVERITY_LABELS[1],
        informational = SEVERITY_LABELS[2],
        min = MIN_ISSUES,
        max = MAX_ISSUES,
        examples = examples,
    )
}
