//! Error — failures of a single oracle call.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("API key not configured for the analysis service")]
    MissingApiKey,

    #[error("Analysis service did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to reach analysis service: {0}")]
    Transport(String),

    #[error("Analysis service rejected credentials: {0}")]
    Authentication(String),

    #[error("Analysis service quota or rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Analysis service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from analysis service: {0}")]
    MalformedResponse(String),

    #[error("No valid response from the analysis service")]
    EmptyReply,
}

/// Longest service error message carried into an [`OracleError`].
const MAX_ERROR_MESSAGE: usize = 500;

/// Map a non-success HTTP status and its body to an [`OracleError`].
///
/// OpenAI-style bodies (`{"error": {"message": ...}}`) are reduced to the
/// message; anything else is carried through, shortened.
pub fn map_http_error(status: u16, body: &str) -> OracleError {
    let message = extract_error_message(body);
    match status {
        401 | 403 => OracleError::Authentication(message),
        429 => OracleError::RateLimited(message),
        _ => OracleError::Status { status, message },
    }
}

fn extract_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match message.char_indices().nth(MAX_ERROR_MESSAGE) {
        Some((idx, _)) => format!("{}…", &message[..idx]),
        None => message,
    }
}
