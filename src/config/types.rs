// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration (standalone transport only)
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Gateway configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Deployment mode; derived from the transport when unset
    #[serde(default)]
    pub mode: Option<DeploymentMode>,
    /// Largest request body accepted by the standalone transport
    pub max_body_size: u64,
}

/// How the API is deployed; decides whether file upload is available
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// Per-event invocation; uploads are refused
    Serverless,
    /// Long-lived HTTP server
    Standalone,
}

/// Transport feeding events into the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Function runtime API: one event per invocation via `lambda_runtime`
    Invoke,
    /// JSON events on stdin, replies on stdout (local harness)
    Stdin,
    /// Local HTTP listener
    Serve,
}

impl Transport {
    pub const fn default_mode(self) -> DeploymentMode {
        match self {
            Self::Invoke | Self::Stdin => DeploymentMode::Serverless,
            Self::Serve => DeploymentMode::Standalone,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoke => "invoke",
            Self::Stdin => "stdin",
            Self::Serve => "http",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout/stderr if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration (standalone transport only)
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}
