//! Error types for the gateway.
//!
//! Three layers:
//!
//! - [`StructuredError`]: a normalized backend failure, carrying the
//!   [`ErrorCode`] derived from the backend HTTP status.
//! - [`GatewayError`]: what operation handlers return. Either a local
//!   authentication failure or a backend failure.
//! - [`ServerError`]: startup and transport failures of the gateway process.

use std::fmt;

use async_graphql::ErrorExtensions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error taxonomy surfaced to GraphQL clients in `extensions.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller did not supply the session/user headers. Never reaches the backend.
    AuthenticationRequired,
    /// Backend answered 400.
    BadRequest,
    /// Backend answered 401.
    Unauthorized,
    /// Backend answered 403.
    Forbidden,
    /// Backend answered 404.
    NotFound,
    /// Backend answered 409.
    Conflict,
    /// Backend answered 422.
    ValidationError,
    /// Backend answered 500.
    InternalServerError,
    /// Any other status, or no response at all.
    UnknownError,
}

impl ErrorCode {
    /// Maps a backend HTTP status to an error code.
    ///
    /// `None` means no response was received.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(400) => Self::BadRequest,
            Some(401) => Self::Unauthorized,
            Some(403) => Self::Forbidden,
            Some(404) => Self::NotFound,
            Some(409) => Self::Conflict,
            Some(422) => Self::ValidationError,
            Some(500) => Self::InternalServerError,
            _ => Self::UnknownError,
        }
    }

    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status recorded when the backend produced no response.
pub const MISSING_STATUS: u16 = 500;

/// Fallback message when neither the backend nor the transport supplied one.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// A normalized backend failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{human_message}")]
pub struct StructuredError {
    /// Message shown to the client.
    pub human_message: String,
    /// Taxonomy code derived from `http_status`.
    pub error_code: ErrorCode,
    /// Backend HTTP status, or 500 when none was received.
    pub http_status: u16,
    /// Raw backend error body, for diagnostics only.
    pub raw_details: Value,
    /// Backend client operation that failed (e.g. `getActivityLogs`).
    pub operation: String,
}

impl StructuredError {
    /// Builds an error from an optional backend status.
    ///
    /// The message is chosen in order: backend `message` field, transport
    /// message, [`UNKNOWN_ERROR_MESSAGE`].
    pub fn new(
        operation: impl Into<String>,
        status: Option<u16>,
        details: Value,
        transport_message: Option<&str>,
    ) -> Self {
        let human_message = details
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .or(transport_message.filter(|m| !m.is_empty()))
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string();

        let raw_details = if details.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            details
        };

        Self {
            human_message,
            error_code: ErrorCode::from_status(status),
            http_status: status.unwrap_or(MISSING_STATUS),
            raw_details,
            operation: operation.into(),
        }
    }

    /// Builds an error for a call that produced no HTTP response.
    pub fn transport(operation: impl Into<String>, message: &str) -> Self {
        Self::new(operation, None, Value::Null, Some(message))
    }

    /// Builds an error for a response whose body did not have the expected shape.
    pub fn malformed(operation: impl Into<String>, status: u16, reason: &str) -> Self {
        Self {
            human_message: format!("Malformed backend response: {reason}"),
            error_code: ErrorCode::UnknownError,
            http_status: status,
            raw_details: Value::Object(serde_json::Map::new()),
            operation: operation.into(),
        }
    }
}

/// Errors returned by operation handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The caller is missing the session and/or user headers.
    #[error("{message}")]
    AuthenticationRequired {
        /// Error message.
        message: String,
    },

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] StructuredError),
}

impl GatewayError {
    /// Create an authentication-required error.
    pub fn authentication_required(message: impl Into<String>) -> Self {
        Self::AuthenticationRequired {
            message: message.into(),
        }
    }

    /// Get the taxonomy code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationRequired { .. } => ErrorCode::AuthenticationRequired,
            Self::Backend(e) => e.error_code,
        }
    }

    /// Get the HTTP status associated with this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AuthenticationRequired { .. } => 401,
            Self::Backend(e) => e.http_status,
        }
    }

    /// Get the failing backend operation, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::AuthenticationRequired { .. } => None,
            Self::Backend(e) => Some(&e.operation),
        }
    }
}

impl ErrorExtensions for GatewayError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code().as_str());
            ext.set("statusCode", i32::from(self.http_status()));
            if let Self::Backend(e) = self {
                ext.set("operation", e.operation.as_str());
                ext.set(
                    "details",
                    async_graphql::Value::from_json(e.raw_details.clone())
                        .unwrap_or(async_graphql::Value::Null),
                );
            }
        })
    }
}

/// Result type for operation handlers.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors of the gateway process itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Server startup error.
    #[error("Server error: {message}")]
    Server {
        /// Error message.
        message: String,
    },

    /// Telemetry setup error.
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] hermes_telemetry::TelemetryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config { .. } => 500,
            Self::Server { .. } => 500,
            Self::Telemetry(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
        }
    }

    /// Get the error category for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Server { .. } => "server",
            Self::Telemetry(_) => "telemetry",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Result type for process-level operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body for HTTP-level error responses (outside GraphQL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error title.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: None,
            details: None,
        }
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set additional details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error, self.message)
    }
}
