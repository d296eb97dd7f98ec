//! Logs module — bounded tail window over the monitored log file.

pub mod tail;

pub use tail::{read_tail, read_tail_from, LogWindow, TailError, TailOptions};
