use analyzer::{OracleConfig, TailOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file locations, lowest priority first. Extensions are resolved by
/// the `config` crate.
const CONFIG_PATHS: [&str; 3] = [
    "/etc/syslens/server",
    "config/server",
    "crates/server/config/server",
];

const ENV_PREFIX: &str = "SYSLENS";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub oracle: OracleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Outer deadline for a whole request; must exceed the oracle timeout.
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Which log file to analyze and how much of it to read.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub path: String,
    pub max_lines: usize,
    pub max_bytes: usize,
    pub chunk_size: usize,
}

impl SourceConfig {
    pub fn tail_options(&self) -> TailOptions {
        TailOptions {
            max_lines: self.max_lines,
            max_bytes: self.max_bytes,
            chunk_size: self.chunk_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

impl AppConfig {
    /// Load configuration from server.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::load_from(&CONFIG_PATHS)
    }

    /// Defaults, then each file in `paths` (all optional), then `SYSLENS_*` env vars.
    fn load_from(paths: &[&str]) -> Result<Self> {
        // Missing keys in files/env fall back to compiled defaults
        let defaults = config::Config::try_from(&AppConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Double underscore for nested keys: SYSLENS_SOURCE__PATH
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.source.path.trim().is_empty() {
            anyhow::bail!("source.path must not be empty");
        }
        for (name, value) in [
            ("source.max_lines", self.source.max_lines),
            ("source.max_bytes", self.source.max_bytes),
            ("source.chunk_size", self.source.chunk_size),
            ("oracle.max_reply_chars", self.oracle.max_reply_chars),
            ("oracle.max_response_bytes", self.oracle.max_response_bytes),
        ] {
            if value == 0 {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }

        if self.oracle.max_tokens == 0 {
            anyhow::bail!("oracle.max_tokens must be greater than zero");
        }
        if self.oracle.timeout_secs == 0 {
            anyhow::bail!("oracle.timeout_secs must be greater than zero");
        }
        if self.server.request_timeout_secs <= self.oracle.timeout_secs {
            anyhow::bail!(
                "server.request_timeout_secs ({}) must exceed oracle.timeout_secs ({})",
                self.server.request_timeout_secs,
                self.oracle.timeout_secs
            );
        }

        let endpoint = self.oracle.endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            anyhow::bail!("oracle.endpoint must be an http(s) URL: {}", endpoint);
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let tail = TailOptions::default();
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:5001".to_string(),
                request_timeout_secs: 90,
                enable_cors: false,
                cors_origins: vec![],
            },
            source: SourceConfig {
                path: "/var/log/syslog".to_string(),
                max_lines: tail.max_lines,
                max_bytes: tail.max_bytes,
                chunk_size: tail.chunk_size,
            },
            oracle: OracleConfig::default(),
            logging: LoggingConfig {
                level: "info,syslens=debug,analyzer=debug".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
        }
    }
}
