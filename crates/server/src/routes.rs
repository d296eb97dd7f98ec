use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use analyzer::AnalysisTable;
use serde_json::json;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiResult;
use crate::page::INDEX_HTML;
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.server.enable_cors {
        let origins = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Same-origin only
        CorsLayer::new()
    };

    // Outer bound; the oracle client carries its own, shorter deadline
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, request_timeout))
                // Nothing here takes a request body
                .layer(DefaultBodyLimit::max(64 * 1024))
                .layer(cors),
        )
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Run the pipeline once against the configured log file.
async fn analyze_handler(State(state): State<AppState>) -> ApiResult<Json<AnalysisTable>> {
    let table = state.analyzer.run().await?;
    Ok(Json(table))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use analyzer::client::FakeOracle;
    use analyzer::OracleError;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::io::Write;
    use std::sync::Arc;
    use tower::ServiceExt;

    const REPLY: &str = "1. **Critical: Disk Failure**: disk /dev/sda reporting I/O errors\n\
                         2. **Informational: Update Applied**: kernel updated to 6.2";

    fn router_for(path: &str, oracle: FakeOracle) -> Router {
        let mut config = AppConfig::default();
        config.source.path = path.to_string();
        build_router(AppState::new(config, Arc::new(oracle)))
    }

    fn log_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    async fn post_analyze(router: Router) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_returns_issue_array() {
        let file = log_file("Oct 11 host kernel: sda I/O error\n");
        let router = router_for(file.path().to_str().unwrap(), FakeOracle::replying(REPLY));

        let (status, body) = post_analyze(router).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {
                    "Issue Name": "Disk Failure",
                    "Analysis": "disk /dev/sda reporting I/O errors",
                    "Severity": "Critical"
                },
                {
                    "Issue Name": "Update Applied",
                    "Analysis": "kernel updated to 6.2",
                    "Severity": "Informational"
                }
            ])
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_log_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("syslog");
        let router = router_for(missing.to_str().unwrap(), FakeOracle::replying(REPLY));

        let (status, body) = post_analyze(router).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Failed to read logs"));
    }

    #[tokio::test]
    async fn test_analyze_empty_log_is_error_payload() {
        let file = log_file("");
        let router = router_for(file.path().to_str().unwrap(), FakeOracle::replying(REPLY));

        let (status, body) = post_analyze(router).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("No logs found"));
    }

    #[tokio::test]
    async fn test_analyze_transport_failure_is_502() {
        let file = log_file("line\n");
        let oracle = FakeOracle::failing(OracleError::Transport("connection refused".into()));
        let router = router_for(file.path().to_str().unwrap(), oracle);

        let (status, body) = post_analyze(router).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
        assert!(body.get(0).is_none());
    }

    #[tokio::test]
    async fn test_analyze_oracle_timeout_is_504() {
        let file = log_file("line\n");
        let oracle = FakeOracle::failing(OracleError::Timeout(Duration::from_secs(60)));
        let router = router_for(file.path().to_str().unwrap(), oracle);

        let (status, _) = post_analyze(router).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_analyze_prose_reply_is_empty_array() {
        let file = log_file("line\n");
        let router = router_for(
            file.path().to_str().unwrap(),
            FakeOracle::replying("The logs look fine."),
        );

        let (status, body) = post_analyze(router).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let router = router_for("/var/log/syslog", FakeOracle::replying(REPLY));
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("fetch(\"/analyze\""));
    }

    #[tokio::test]
    async fn test_health() {
        let router = router_for("/var/log/syslog", FakeOracle::replying(REPLY));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_requires_post() {
        let router = router_for("/var/log/syslog", FakeOracle::replying(REPLY));
        let response = router
            .oneshot(Request::builder().uri("/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
