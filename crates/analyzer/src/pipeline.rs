//! Pipeline — tail → prompt → oracle → parser for a single request.
//!
//! Nothing here outlives a call to [`Analyzer::run`]; the only shared piece
//! is the oracle client, which is immutable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{OracleError, OracleOps};
use crate::logs::{read_tail, LogWindow, TailError, TailOptions};
use crate::parser::{parse_analysis, AnalysisTable, Severity};
use crate::prompt::AnalysisRequest;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Tail(#[from] TailError),

    #[error("No logs found in {}", .0.display())]
    NoLogs(PathBuf),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Log reader task failed: {0}")]
    Join(String),
}

/// Wires the four stages together. Build once, share behind an `Arc`.
pub struct Analyzer {
    oracle: Arc<dyn OracleOps>,
    source: PathBuf,
    tail: TailOptions,
}

impl Analyzer {
    pub fn new(oracle: Arc<dyn OracleOps>, source: impl Into<PathBuf>, tail: TailOptions) -> Self {
        Self {
            oracle,
            source: source.into(),
            tail,
        }
    }

    /// The log file being analyzed.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn tail_options(&self) -> &TailOptions {
        &self.tail
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Read the tail window off the async runtime.
    pub async fn read_window(&self) -> Result<LogWindow, AnalyzeError> {
        let source = self.source.clone();
        let options = self.tail;
        let window = tokio::task::spawn_blocking(move || read_tail(&source, &options))
            .await
            .map_err(|e| AnalyzeError::Join(e.to_string()))??;
        Ok(window)
    }

    /// Ask the oracle about an already-read window and parse its reply.
    pub async fn analyze_window(&self, window: &LogWindow) -> Result<AnalysisTable, AnalyzeError> {
        if window.is_empty() {
            return Err(AnalyzeError::NoLogs(self.source.clone()));
        }

        let request = AnalysisRequest::compose(window);
        let started = Instant::now();
        let reply = self.oracle.complete(&request).await?;

        if reply.is_blank() {
            warn!(oracle = self.oracle.name(), "Oracle returned an empty reply");
            return Err(OracleError::EmptyReply.into());
        }

        let table = parse_analysis(reply.as_str());
        info!(
            oracle = self.oracle.name(),
            lines = window.len(),
            issues = table.len(),
            critical = table.count(Severity::Critical),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Log analysis complete"
        );
        Ok(table)
    }

    /// Run the whole pipeline once.
    pub async fn run(&self) -> Result<AnalysisTable, AnalyzeError> {
        let window = self.read_window().await?;
        debug!(
            source = %self.source.display(),
            lines = window.len(),
            bytes_scanned = window.bytes_scanned(),
            "Log window ready"
        );
        self.analyze_window(&window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeOracle;
    use std::io::Write;

    const SCENARIO: &str = "1. **Critical: Disk Failure**: disk /dev/sda reporting I/O errors\n\
                            2. **Informational: Update Applied**: kernel updated to 6.2";

    fn log_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_run_produces_table() {
        let file = log_file("Oct 11 host kernel: sda I/O error\nOct 11 host apt: upgraded linux\n");
        let fake = Arc::new(FakeOracle::replying(SCENARIO));
        let analyzer = Analyzer::new(fake.clone(), file.path(), TailOptions::default());

        let table = analyzer.run().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.issues()[0].title(), "Disk Failure");
        assert_eq!(table.issues()[1].severity(), Severity::Informational);

        let requests = fake.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].logs(),
            "Oct 11 host kernel: sda I/O error\nOct 11 host apt: upgraded linux"
        );
    }

    #[tokio::test]
    async fn test_window_is_bounded_before_oracle() {
        let contents: String = (0..50).map(|i| format!("entry {}\n", i)).collect();
        let file = log_file(&contents);
        let fake = Arc::new(FakeOracle::replying(SCENARIO));
        let analyzer = Analyzer::new(
            fake.clone(),
            file.path(),
            TailOptions::default().with_max_lines(10),
        );

        analyzer.run().await.unwrap();
        let request = &fake.requests().await[0];
        assert_eq!(request.line_count(), 10);
        assert!(request.logs().starts_with("entry 40\n"));
        assert!(request.logs().ends_with("entry 49"));
    }

    #[tokio::test]
    async fn test_missing_file_skips_oracle() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeOracle::replying(SCENARIO));
        let analyzer = Analyzer::new(fake.clone(), dir.path().join("syslog"), TailOptions::default());

        let err = analyzer.run().await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Tail(TailError::Open { .. })));
        assert_eq!(fake.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_file_reports_no_logs() {
        let file = log_file("");
        let fake = Arc::new(FakeOracle::replying(SCENARIO));
        let analyzer = Analyzer::new(fake.clone(), file.path(), TailOptions::default());

        let err = analyzer.run().await.unwrap_err();
        assert!(matches!(err, AnalyzeError::NoLogs(_)));
        assert_eq!(fake.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_surfaced() {
        let file = log_file("line\n");
        let fake = Arc::new(FakeOracle::failing(OracleError::Transport(
            "connection reset by peer".into(),
        )));
        let analyzer = Analyzer::new(fake, file.path(), TailOptions::default());

        let err = analyzer.run().await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Oracle(OracleError::Transport(_))));
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_blank_reply_is_an_error() {
        let file = log_file("line\n");
        let analyzer = Analyzer::new(
            Arc::new(FakeOracle::replying("  \n ")),
            file.path(),
            TailOptions::default(),
        );

        let err = analyzer.run().await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Oracle(OracleError::EmptyReply)));
    }

    #[tokio::test]
    async fn test_nonconforming_reply_is_empty_table() {
        let file = log_file("line\n");
        let analyzer = Analyzer::new(
            Arc::new(FakeOracle::replying("Everything looks healthy to me.")),
            file.path(),
            TailOptions::default(),
        );

        let table = analyzer.run().await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_window_directly() {
        let analyzer = Analyzer::new(
            Arc::new(FakeOracle::replying("1. **Service Crash**: segfault in nginx")),
            "/unused",
            TailOptions::default(),
        );
        let table = analyzer
            .analyze_window(&LogWindow::from_lines(["nginx[1]: segfault"]))
            .await
            .unwrap();
        assert_eq!(table.issues()[0].severity(), Severity::Critical);
        assert_eq!(analyzer.oracle_name(), "fake");
    }
}
