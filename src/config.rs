//! Server and client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Numeric settings fall back to their
//! defaults when missing or unparsable; socket addresses and origins are
//! reported as [`ConfigError`] instead.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default port of the EventSource endpoint.
pub const DEFAULT_STREAM_PORT: u16 = 8080;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A socket address variable could not be parsed.
    #[error("invalid socket address in {key}: {source}")]
    InvalidAddr {
        /// Environment variable name.
        key: &'static str,
        /// Underlying parse error.
        source: std::net::AddrParseError,
    },
}

/// Panel server configuration.
///
/// Loaded once at startup via [`PanelConfig::from_env`].
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Socket address of the web server (assets + command API).
    pub web_listen_addr: SocketAddr,

    /// Socket address of the EventSource server.
    pub sse_listen_addr: SocketAddr,

    /// Directory the web assets are served from.
    pub asset_dir: PathBuf,

    /// Maximum number of concurrent EventSource sessions.
    pub sse_max_sessions: usize,

    /// Maximum encoded size of a single event in bytes.
    pub sse_max_event_bytes: usize,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Tick of the execution loop.
    pub execution_poll_interval: Duration,

    /// Request timeout applied to the web router.
    pub http_timeout: Duration,

    /// Placeholder values for `index.html`, in placeholder order.
    pub index_template_values: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            web_listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            sse_listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_STREAM_PORT)),
            asset_dir: PathBuf::from("web"),
            sse_max_sessions: 5,
            sse_max_event_bytes: 1024,
            event_bus_capacity: 1024,
            execution_poll_interval: Duration::from_millis(1000),
            http_timeout: Duration::from_secs(30),
            index_template_values: split_values("A,B,"),
        }
    }
}

impl PanelConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddr`] if `WEB_LISTEN_ADDR` or
    /// `SSE_LISTEN_ADDR` is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            web_listen_addr: parse_addr("WEB_LISTEN_ADDR", defaults.web_listen_addr)?,
            sse_listen_addr: parse_addr("SSE_LISTEN_ADDR", defaults.sse_listen_addr)?,
            asset_dir: std::env::var("ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_dir),
            sse_max_sessions: parse_env("SSE_MAX_SESSIONS", defaults.sse_max_sessions),
            sse_max_event_bytes: parse_env("SSE_MAX_EVENT_BYTES", defaults.sse_max_event_bytes),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity)
                .max(1),
            execution_poll_interval: Duration::from_millis(
                parse_env("EXECUTION_POLL_INTERVAL_MS", 1000_u64).max(1),
            ),
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 30)),
            index_template_values: std::env::var("INDEX_TEMPLATE_VALUES")
                .map(|v| split_values(&v))
                .unwrap_or(defaults.index_template_values),
        })
    }
}

/// Page client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the page was loaded from (e.g. `http://192.168.4.1`).
    pub origin: String,

    /// Port of the EventSource endpoint on the same host.
    pub stream_port: u16,

    /// Identifier of the bound UI control.
    pub control_id: String,

    /// Command sent when the control is activated.
    pub command: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:3000".to_string(),
            stream_port: DEFAULT_STREAM_PORT,
            control_id: "xxxx".to_string(),
            command: "xxxxx".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads the client configuration from `PANEL_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            origin: std::env::var("PANEL_ORIGIN").unwrap_or(defaults.origin),
            stream_port: parse_env("PANEL_STREAM_PORT", defaults.stream_port),
            control_id: std::env::var("PANEL_CONTROL_ID").unwrap_or(defaults.control_id),
            command: std::env::var("PANEL_COMMAND").unwrap_or(defaults.command),
        }
    }
}

fn parse_addr(key: &'static str, default: SocketAddr) -> Result<SocketAddr, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { key, source }),
        Err(_) => Ok(default),
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}
