//! Fake — test double for the completion service.
//!
//! Provides a deterministic [`FakeOracle`] that implements [`OracleOps`]
//! from canned state. Useful for unit-testing the pipeline and the HTTP
//! routes without a network or an API key.

use tokio::sync::Mutex;

use crate::prompt::AnalysisRequest;

use super::error::OracleError;
use super::oracle::{OracleFuture, OracleOps, RawAnalysis};

/// A fake oracle that answers every call with the same canned outcome.
pub struct FakeOracle {
    outcome: Result<String, OracleError>,
    seen: Mutex<Vec<AnalysisRequest>>,
}

impl FakeOracle {
    /// Answer every request with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            outcome: Ok(reply.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with `err`.
    pub fn failing(err: OracleError) -> Self {
        Self {
            outcome: Err(err),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<AnalysisRequest> {
        self.seen.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.seen.lock().await.len()
    }
}

impl OracleOps for FakeOracle {
    fn name(&self) -> &str {
        "fake"
    }

    fn complete<'a>(&'a self, request: &'a AnalysisRequest) -> OracleFuture<'a> {
        Box::pin(async move {
            self.seen.lock().await.push(request.clone());
            self.outcome.clone().map(RawAnalysis::new)
        })
    }
}
