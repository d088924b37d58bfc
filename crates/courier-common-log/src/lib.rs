//! Logging setup for courier.
//!
//! Libraries in this workspace only emit `tracing` events. Binaries and
//! test harnesses call [`init`] once to install a subscriber.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Environment variable names read by [`LogConfig::from_env`].
pub mod vars {
    pub const COURIER_LOG_LEVEL: &str = "COURIER_LOG_LEVEL";
    pub const COURIER_LOG_FORMAT: &str = "COURIER_LOG_FORMAT";
    pub const COURIER_LOG_FILE: &str = "COURIER_LOG_FILE";
    pub const COURIER_LOG_SOURCE: &str = "COURIER_LOG_SOURCE";
    pub const COURIER_LOG_SPANS: &str = "COURIER_LOG_SPANS";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Also append log lines to this file.
    pub file_path: Option<PathBuf>,
    /// Include source file and line.
    pub source_location: bool,
    /// Emit span open/close events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field format.
    #[default]
    Pretty,
    /// Single-line format.
    Compact,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Parse from string; anything unknown is `Pretty`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
        }
    }
}

fn env_flag(var: &str) -> Option<bool> {
    std::env::var(var)
        .ok()
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

impl LogConfig {
    /// Create config from `COURIER_LOG_*` variables, falling back to `RUST_LOG`
    /// for the level.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let level = std::env::var(vars::COURIER_LOG_LEVEL)
            .or_else(|_| std::env::var(vars::RUST_LOG))
            .ok()
            .and_then(|l| LogLevel::parse(&l));
        if let Some(level) = level {
            config.level = level;
        }

        if let Ok(format) = std::env::var(vars::COURIER_LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }

        if let Ok(file_path) = std::env::var(vars::COURIER_LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Some(source_location) = env_flag(vars::COURIER_LOG_SOURCE) {
            config.source_location = source_location;
        }

        if let Some(span_events) = env_flag(vars::COURIER_LOG_SPANS) {
            config.span_events = span_events;
        }

        config
    }
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` directives, when valid, take precedence over `config.level`.
/// Fails if a global subscriber is already installed.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let source = config.source_location;

    let file = match &config.file_path {
        Some(path) => Some(Arc::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        )),
        None => None,
    };
    let json = config.format == LogFormat::Json;

    let pretty_layer = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_file(source)
            .with_line_number(source)
            .with_span_events(span_events.clone())
    });
    let compact_layer = (config.format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_ansi(true)
            .with_span_events(span_events.clone())
    });
    let json_layer = json.then(|| fmt::layer().json().with_span_events(span_events.clone()));

    let (text_file, json_file) = match file {
        Some(file) if json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_span_events(span_events.clone()),
            ),
        ),
        Some(file) => (
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(source)
                    .with_line_number(source)
                    .with_span_events(span_events.clone()),
            ),
            None,
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(compact_layer)
        .with(json_layer)
        .with(text_file)
        .with(json_file)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    Init(String),

    #[error("failed to open log file: {0}")]
    File(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Request spans and timing.
pub mod spans;
