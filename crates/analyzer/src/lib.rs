// Module layout for the syslens analyzer.

// Stages
pub mod logs;
pub mod prompt;
pub mod client;
pub mod parser;

// Wiring
pub mod pipeline;

pub use client::{ApiKey, OpenAiOracle, OracleConfig, OracleError, OracleOps};
pub use logs::{LogWindow, TailOptions};
pub use parser::{AnalysisTable, Issue, Severity};
pub use pipeline::{AnalyzeError, Analyzer};
