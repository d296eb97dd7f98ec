//! Response — tolerant extraction of issues from the oracle's free-text reply.
//!
//! The oracle is asked for a numbered list (see [`crate::prompt::contract`])
//! but nothing forces it to comply. Anything that does not look like an
//! entry header is ignored; the worst case is an empty table.

use std::sync::OnceLock;

use regex::Regex;

use crate::prompt::contract::ENTRY_HEADER_PATTERN;

use super::model::{AnalysisTable, Issue, Severity};
use super::severity::classify_title;

/// Compiled entry header (initialized once).
fn entry_header() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(ENTRY_HEADER_PATTERN).ok())
        .as_ref()
}

/// A matched header: where it starts and ends, plus the raw bold title.
struct Header<'t> {
    start: usize,
    end: usize,
    raw_title: &'t str,
}

/// Extract every issue from `text`, in source order. Never fails.
///
/// Each entry's analysis runs from the end of its header to the start of the
/// next header, or to the end of the text.
pub fn parse_analysis(text: &str) -> AnalysisTable {
    let Some(header) = entry_header() else {
        tracing::error!("Entry header pattern failed to compile");
        return AnalysisTable::default();
    };

    let headers: Vec<Header<'_>> = header
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1)?;
            Some(Header {
                start: whole.start(),
                end: whole.end(),
                raw_title: title.as_str(),
            })
        })
        .collect();

    let issues = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let body_end = headers.get(i + 1).map_or(text.len(), |next| next.start);
            build_issue(h.raw_title, &text[h.end..body_end])
        })
        .collect::<Vec<_>>();

    if issues.is_empty() && !text.trim().is_empty() {
        tracing::warn!(reply_len = text.len(), "Oracle reply contained no recognizable entries");
    }

    AnalysisTable::new(issues)
}

fn build_issue(raw_title: &str, body: &str) -> Issue {
    let body = body.trim();

    // `**Critical:** Disk Failure on sda, ...` puts the title in the body.
    if let Some(severity) = Severity::from_label(raw_title) {
        let title = leading_clause(body).unwrap_or(raw_title.trim());
        return Issue::new(title.to_string(), body.to_string(), severity);
    }

    let (title, severity) = split_title(raw_title);
    Issue::new(title.trim().to_string(), body.to_string(), severity)
}

/// Split `Severity: Title` on the first colon.
///
/// A prefix that is not exactly a label is searched for a label word
/// (`Critical Issue:`). Failing that, severity falls back to keyword
/// inference over the whole raw title.
fn split_title(raw_title: &str) -> (&str, Severity) {
    match raw_title.split_once(':') {
        Some((declared, title)) => {
            let severity = Severity::from_label(declared)
                .or_else(|| Severity::find_label(declared))
                .unwrap_or_else(|| classify_title(raw_title));
            (title, severity)
        }
        None => (raw_title, classify_title(raw_title)),
    }
}

/// First line of `body` up to the first `,` or `;`, without a trailing period.
fn leading_clause(body: &str) -> Option<&str> {
    let line = body.lines().next()?;
    let end = line.find([',', ';']).unwrap_or(line.len());
    let clause = line[..end].trim().trim_end_matches('.').trim_end();
    (!clause.is_empty()).then_some(clause)
}
