//! Live — `OracleOps` over an OpenAI-compatible chat-completions endpoint.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::prompt::AnalysisRequest;

use super::error::{map_http_error, OracleError};
use super::oracle::{OracleFuture, OracleOps, RawAnalysis};

/// Default OpenAI API endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Connection and cost limits for the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    /// Completion token cap sent with every request.
    pub max_tokens: u32,
    /// Whole-request deadline, connect through last body byte.
    pub timeout_secs: u64,
    /// Replies longer than this are cut before parsing.
    pub max_reply_chars: usize,
    /// Most bytes read from any response body, success or error.
    pub max_response_bytes: usize,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Explicit proxy URL. `None` disables proxying, ignoring env vars.
    pub proxy: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: OPENAI_API_URL.to_string(),
            model: "gpt-4-turbo".to_string(),
            max_tokens: 800,
            timeout_secs: 60,
            max_reply_chars: 16_000,
            max_response_bytes: 1024 * 1024,
            api_key_env: "OPENAI_API_KEY".to_string(),
            proxy: None,
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key.trim().to_string()))
        }
    }

    /// Read the key from the named environment variable.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// OpenAI chat-completions oracle.
///
/// Built once at startup; the inner `reqwest::Client` pools connections
/// across requests.
pub struct OpenAiOracle {
    config: OracleConfig,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl OpenAiOracle {
    pub fn new(config: OracleConfig, api_key: Option<ApiKey>) -> Result<Self, OracleError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout());
        builder = match config.proxy.as_deref() {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url)
                    .map_err(|e| OracleError::Transport(format!("Invalid proxy URL: {}", e)))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };
        let client = builder
            .build()
            .map_err(|e| OracleError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "No API key configured; every analysis request will fail until one is set"
            );
        }

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &AnalysisRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": request.instructions() },
                { "role": "user", "content": request.logs() },
            ],
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout(self.config.timeout())
        } else {
            OracleError::Transport(err.to_string())
        }
    }

    /// Read at most `max_response_bytes` of the body. The flag is set when
    /// the body was longer and the rest was left unread.
    async fn read_body_capped(
        &self,
        mut response: reqwest::Response,
    ) -> Result<(String, bool), OracleError> {
        let cap = self.config.max_response_bytes;
        let mut buf: Vec<u8> = Vec::new();
        let mut overflowed = false;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_transport(e))? {
            let room = cap.saturating_sub(buf.len());
            if chunk.len() > room {
                buf.extend_from_slice(&chunk[..room]);
                overflowed = true;
                break;
            }
            buf.extend_from_slice(&chunk);
        }

        if overflowed {
            debug!(cap, "Response body cut at the byte cap");
        }
        Ok((String::from_utf8_lossy(&buf).into_owned(), overflowed))
    }

    async fn send(&self, request: &AnalysisRequest) -> Result<RawAnalysis, OracleError> {
        let api_key = self.api_key.as_ref().ok_or(OracleError::MissingApiKey)?;
        let body = self.build_request_body(request);
        let started = Instant::now();

        debug!(
            model = %self.config.model,
            lines = request.line_count(),
            payload_bytes = request.logs().len(),
            "Sending analysis request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status().as_u16();
        let (body_text, overflowed) = self.read_body_capped(response).await?;

        if !(200..300).contains(&status) {
            let err = map_http_error(status, &body_text);
            warn!(status, error = %err, "Analysis service returned an error");
            return Err(err);
        }
        if overflowed {
            return Err(OracleError::MalformedResponse(format!(
                "response body exceeded {} bytes",
                self.config.max_response_bytes
            )));
        }

        let completion = extract_reply(&body_text)?;
        let reply = RawAnalysis::new(completion.content).truncated(self.config.max_reply_chars);

        info!(
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_chars = reply.as_str().chars().count(),
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "Analysis service replied"
        );

        Ok(reply)
    }
}

impl OracleOps for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete<'a>(&'a self, request: &'a AnalysisRequest) -> OracleFuture<'a> {
        Box::pin(self.send(request))
    }
}

/// First choice's text plus why generation stopped.
#[derive(Debug, PartialEq, Eq)]
struct Completion {
    content: String,
    finish_reason: Option<String>,
}

/// Pull the reply text out of a chat-completions response body.
fn extract_reply(body_text: &str) -> Result<Completion, OracleError> {
    let response: ChatCompletionResponse = serde_json::from_str(body_text)
        .map_err(|e| OracleError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::MalformedResponse("response has no choices".to_string()))?;

    Ok(Completion {
        content: choice.message.and_then(|m| m.content).unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
