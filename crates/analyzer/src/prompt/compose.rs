//! Compose — turn a log window into the request sent to the oracle.

use crate::logs::LogWindow;

use super::contract;

/// Instruction contract plus log payload for a single oracle call.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    instructions: String,
    logs: String,
    line_count: usize,
}

impl AnalysisRequest {
    /// Pair the fixed instruction contract with the window's lines, joined verbatim.
    pub fn compose(window: &LogWindow) -> Self {
        Self {
            instructions: contract::instructions(),
            logs: window.joined(),
            line_count: window.len(),
        }
    }

    /// System-role text.
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// User-role text: the log lines.
    pub fn logs(&self) -> &str {
        &self.logs
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn contract_version(&self) -> u32 {
        contract::CONTRACT_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_joins_lines_verbatim() {
        let window = LogWindow::from_lines([
            "Oct 11 22:14:15 host sshd[42]: Failed password for root",
            "Oct 11 22:14:16 host kernel: <*> weird & chars \"kept\"",
        ]);
        let request = AnalysisRequest::compose(&window);
        assert_eq!(
            request.logs(),
            "Oct 11 22:14:15 host sshd[42]: Failed password for root\n\
             Oct 11 22:14:16 host kernel: <*> weird & chars \"kept\""
        );
        assert_eq!(request.line_count(), 2);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let window = LogWindow::from_lines(["a", "b"]);
        assert_eq!(AnalysisRequest::compose(&window), AnalysisRequest::compose(&window));
    }

    #[test]
    fn test_instructions_come_from_contract() {
        let request = AnalysisRequest::compose(&LogWindow::default());
        assert_eq!(request.instructions(), contract::instructions());
        assert_eq!(request.contract_version(), contract::CONTRACT_VERSION);
        assert!(request.logs().is_empty());
    }
}
