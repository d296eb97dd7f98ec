//! Oracle trait — abstract interface to the text-completion service.
//!
//! The pipeline only ever talks to the oracle through this trait.
//! `live.rs` provides the real HTTP-backed implementation.
//! `fake.rs` provides a test double.

use std::future::Future;
use std::pin::Pin;

use crate::prompt::AnalysisRequest;

use super::error::OracleError;

/// Boxed future returned by [`OracleOps::complete`].
pub type OracleFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawAnalysis, OracleError>> + Send + 'a>>;

/// Unified async interface over the completion service.
///
/// Object-safe thanks to `Pin<Box<…>>` returns, so it can live behind
/// `Arc<dyn OracleOps>` in the request handlers.
pub trait OracleOps: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Send one request and wait for the reply. One outbound call, no retry.
    fn complete<'a>(&'a self, request: &'a AnalysisRequest) -> OracleFuture<'a>;
}

/// The oracle's reply, untouched. No structural guarantee whatsoever.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAnalysis(String);

impl RawAnalysis {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Cut the reply down to at most `max_chars` characters.
    pub fn truncated(mut self, max_chars: usize) -> Self {
        if let Some((idx, _)) = self.0.char_indices().nth(max_chars) {
            self.0.truncate(idx);
        }
        self
    }
}

impl From<String> for RawAnalysis {
    fn from(text: String) -> Self {
        Self(text)
    }
}
