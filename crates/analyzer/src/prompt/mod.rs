//! Prompt module — instruction contract and request composition.

pub mod contract;
pub mod compose;

pub use compose::AnalysisRequest;
