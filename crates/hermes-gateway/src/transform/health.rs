//! Backend health and readiness shapes.

use serde_json::Value;

use crate::model::{DateTime, HealthStatus};

/// Healthy backend.
pub const STATUS_UP: &str = "UP";
/// Unhealthy or unreachable backend.
pub const STATUS_DOWN: &str = "DOWN";
/// Backend ready to serve.
pub const STATUS_READY: &str = "READY";
/// Backend not ready or unreachable.
pub const STATUS_NOT_READY: &str = "NOT_READY";

/// Which probe a document answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `GET /api/health`.
    Health,
    /// `GET /api/ready`.
    Readiness,
}

impl Probe {
    /// Status used when the backend document has none.
    pub fn default_status(self) -> &'static str {
        match self {
            Self::Health => STATUS_UP,
            Self::Readiness => STATUS_READY,
        }
    }

    /// Status reported when the backend call fails.
    pub fn failed_status(self) -> &'static str {
        match self {
            Self::Health => STATUS_DOWN,
            Self::Readiness => STATUS_NOT_READY,
        }
    }

    /// Prefix of the failure details.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Self::Health => "Health check failed",
            Self::Readiness => "Readiness check failed",
        }
    }
}

/// Map a backend document. `details` is its compact JSON.
pub fn health_status(probe: Probe, document: &Value, checked_at: DateTime) -> HealthStatus {
    let status = document
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(probe.default_status());

    HealthStatus {
        status: status.to_string(),
        timestamp: checked_at,
        details: Some(document.to_string()),
    }
}

/// Status reported when the backend could not be checked.
pub fn health_failure(probe: Probe, message: &str, checked_at: DateTime) -> HealthStatus {
    HealthStatus {
        status: probe.failed_status().to_string(),
        timestamp: checked_at,
        details: Some(format!("{}: {message}", probe.failure_prefix())),
    }
}
