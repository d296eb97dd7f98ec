use analyzer::{AnalyzeError, OracleError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to read logs: {0}")]
    LogRead(String),

    #[error("No logs found or error reading the file: {0}")]
    NoLogs(String),

    #[error("Analysis service failed: {0}")]
    Oracle(String),

    #[error("Analysis service timed out: {0}")]
    OracleTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convenience type alias
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::LogRead(_) | ApiError::NoLogs(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Oracle(_) => StatusCode::BAD_GATEWAY,
            ApiError::OracleTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message sent to the client. Internal details stay in the server log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Tail(e) => ApiError::LogRead(e.to_string()),
            AnalyzeError::NoLogs(path) => ApiError::NoLogs(path.display().to_string()),
            AnalyzeError::Oracle(e @ OracleError::Timeout(_)) => ApiError::OracleTimeout(e.to_string()),
            AnalyzeError::Oracle(e) => ApiError::Oracle(e.to_string()),
            AnalyzeError::Join(detail) => ApiError::Internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();
        tracing::warn!(status = status.as_u16(), error = %message, "Request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
