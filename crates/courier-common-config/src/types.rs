//! Configuration types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Outbound client settings.
    pub client: ClientSettings,
    /// Recommended server timeouts.
    pub server: ServerSettings,
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// TCP connect timeout (ms).
    pub connect_timeout_ms: u64,
    /// TCP keep-alive interval (secs).
    pub keep_alive_secs: u64,
    /// How long an idle pooled connection is kept (secs).
    pub idle_conn_timeout_secs: u64,
    /// TLS handshake timeout (secs).
    pub tls_handshake_timeout_secs: u64,
    /// Expect-continue timeout (ms).
    pub expect_continue_timeout_ms: u64,
    /// Whole-request timeout, body read included (ms).
    pub request_timeout_ms: u64,
    /// Maximum idle pooled connections.
    pub max_idle_conns: usize,
    /// Skip TLS certificate verification.
    pub insecure_skip_verify: bool,
    /// User agent; `None` uses the library default.
    pub user_agent: Option<String>,
    /// Accept gzip-encoded responses.
    pub gzip: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1_000,
            keep_alive_secs: 30,
            idle_conn_timeout_secs: 90,
            tls_handshake_timeout_secs: 10,
            expect_continue_timeout_ms: 1_000,
            request_timeout_ms: 5_000,
            max_idle_conns: 8,
            insecure_skip_verify: false,
            user_agent: None,
            gzip: true,
        }
    }
}

/// HTTP server timeout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub read_timeout_secs: u64,
    pub read_header_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            read_timeout_secs: 10,
            read_header_timeout_secs: 5,
            write_timeout_secs: 10,
            idle_timeout_secs: 600, // 10 minutes
        }
    }
}
