//! Access log format module
//!
//! One entry is written per invocation. Supported formats:
//! - `combined` (CLF plus user agent and transport)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` substitution

use chrono::Local;
use std::net::SocketAddr;

use crate::config::Transport;
use crate::gateway::{InvocationEvent, Query};

/// Access log entry for one invocation
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Transport the event arrived through
    pub transport: Transport,
    /// Peer address; only known for the HTTP transport
    pub remote_addr: Option<String>,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query rendering (without leading ?)
    pub query: Option<String>,
    pub status: u16,
    /// Reply body size in bytes
    pub body_bytes: usize,
    pub user_agent: Option<String>,
    /// Invocation time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry from the raw event, before it is decoded
    pub fn from_event(
        event: &InvocationEvent,
        transport: Transport,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            transport,
            remote_addr: remote_addr.map(|addr| addr.ip().to_string()),
            time: Local::now(),
            method: event
                .method
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("GET")
                .to_ascii_uppercase(),
            path: event
                .path
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            query: Query::from(event.query()).display(),
            status: 200,
            body_bytes: 0,
            user_agent: event.header("user-agent").map(ToString::to_string),
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn remote(&self) -> &str {
        self.remote_addr.as_deref().unwrap_or("-")
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_user_agent" $transport`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" {}",
            self.format_common(),
            self.user_agent.as_deref().unwrap_or("-"),
            self.transport,
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}\" {} {}",
            self.remote(),
            self.time_local(),
            self.method,
            self.request_uri(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "transport": self.transport.as_str(),
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$transport`, `$request_method`, `$request_uri`, `$request_time`
    /// (seconds, 3 decimals), `$status`, `$body_bytes_sent`,
    /// `$http_user_agent`.
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        pattern
            .replace("$remote_addr", self.remote())
            .replace("$time_local", &self.time_local())
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$transport", self.transport.as_str())
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.request_uri())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}
