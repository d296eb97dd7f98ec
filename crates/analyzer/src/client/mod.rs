//! Client module — the analysis oracle boundary.
//!
//! - `oracle.rs`: the `OracleOps` trait and `RawAnalysis`
//! - `live.rs`: OpenAI-compatible HTTP implementation
//! - `fake.rs`: deterministic test double
//! - `error.rs`: `OracleError` and HTTP status mapping

pub mod oracle;
pub mod live;
pub mod fake;
pub mod error;

pub use error::OracleError;
pub use fake::FakeOracle;
pub use live::{ApiKey, OpenAiOracle, OracleConfig};
pub use oracle::{OracleFuture, OracleOps, RawAnalysis};
