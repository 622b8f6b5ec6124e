//! Structured logging for the gateway.
//!
//! Installs a `tracing-subscriber` registry with an env filter and either a
//! JSON formatter (production) or a human-readable one (development).
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::logging::{LogConfig, init_logging};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::info!(operation = "login", username = "alice", "Login request");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level or filter directive (e.g., "info", "hermes_gateway=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (enter, exit, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name attached to the startup event.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            include_target: true,
            service_name: "hermes-gateway".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
            service_name: "hermes-gateway".to_string(),
        }
    }

    /// Sets the log level or filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Selects the output format by name.
    ///
    /// `json` selects structured output; `pretty`, `simple` and `text`
    /// select the human-readable formatter.
    pub fn with_format(mut self, format: &str) -> TelemetryResult<Self> {
        self.json_format = match format.trim().to_ascii_lowercase().as_str() {
            "json" => true,
            "pretty" | "simple" | "text" => false,
            other => {
                return Err(TelemetryError::InvalidConfig(format!(
                    "unknown log format: {other}"
                )))
            }
        };
        Ok(self)
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    let output: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        base.json().with_filter(filter).boxed()
    } else {
        base.pretty().with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(output)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(service = %config.service_name, level = %config.level, "Logging initialized");

    Ok(())
}

/// Creates an env filter from a string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Field names used by the gateway's log events.
pub mod fields {
    /// Request ID, also sent as `x-request-id`.
    pub const REQUEST_ID: &str = "request_id";
    /// GraphQL or backend operation.
    pub const OPERATION: &str = "operation";
    /// HTTP method.
    pub const METHOD: &str = "method";
    /// Request path.
    pub const PATH: &str = "path";
    /// HTTP status code.
    pub const STATUS: &str = "status";
    /// Duration in milliseconds.
    pub const DURATION_MS: &str = "duration_ms";
    /// Caller user agent.
    pub const USER_AGENT: &str = "user_agent";
    /// Remote socket address.
    pub const PEER: &str = "peer";
    /// Authenticated user.
    pub const USER_ID: &str = "user_id";
    /// Error message.
    pub const ERROR: &str = "error";
}
