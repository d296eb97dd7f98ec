use crate::config::AppConfig;
use analyzer::{Analyzer, OracleOps};
use std::sync::Arc;
use tracing::info;

/// Shared application state (thread-safe, read-only after startup)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(config: AppConfig, oracle: Arc<dyn OracleOps>) -> Self {
        let analyzer = Analyzer::new(oracle, &config.source.path, config.source.tail_options());

        info!(
            source = %analyzer.source().display(),
            oracle = analyzer.oracle_name(),
            max_lines = config.source.max_lines,
            "Analyzer ready"
        );

        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        }
    }
}
