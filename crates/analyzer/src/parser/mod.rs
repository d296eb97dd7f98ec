//! Parser module — structured issues from the oracle's free-text reply.
//!
//! - `model.rs`: `Severity`, `Issue`, `AnalysisTable`
//! - `severity.rs`: keyword-based severity inference
//! - `response.rs`: the tolerant entry grammar

pub mod model;
pub mod severity;
pub mod response;

pub use model::{AnalysisTable, Issue, Severity};
pub use response::parse_analysis;
pub use severity::classify_title;
