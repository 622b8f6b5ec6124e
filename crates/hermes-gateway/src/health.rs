//! Liveness and readiness of the gateway process itself.
//!
//! These back `GET /health` and `GET /ready` and never contact the backend;
//! backend health is exposed through the `health`/`readiness` GraphQL
//! queries instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::model::DateTime;

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always `UP` while the process serves requests.
    pub status: String,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    /// Service name.
    pub service: String,
    /// Gateway version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// `GET /ready` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// `READY` or `NOT_READY`.
    pub status: String,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    /// Service name.
    pub service: String,
}

impl ReadinessResponse {
    /// Whether the gateway accepts traffic.
    pub fn is_ready(&self) -> bool {
        self.status == "READY"
    }
}

/// Health checker for the gateway.
#[derive(Debug)]
pub struct HealthChecker {
    /// Start time for uptime calculation.
    start_time: Instant,
    /// Whether the gateway is ready.
    ready: AtomicBool,
    /// Service name reported in responses.
    service_name: String,
}

impl HealthChecker {
    /// Create a new health checker. It starts out not ready.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            ready: AtomicBool::new(false),
            service_name: service_name.into(),
        }
    }

    /// Mark the gateway as ready or not.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if the gateway is ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Get the uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Perform a liveness check.
    pub fn liveness(&self) -> LivenessResponse {
        LivenessResponse {
            status: "UP".to_string(),
            timestamp: DateTime::now().to_rfc3339(),
            service: self.service_name.clone(),
            version: crate::VERSION.to_string(),
            uptime_seconds: self.uptime().as_secs(),
        }
    }

    /// Perform a readiness check.
    pub fn readiness(&self) -> ReadinessResponse {
        let status = if self.is_ready() { "READY" } else { "NOT_READY" };

        ReadinessResponse {
            status: status.to_string(),
            timestamp: DateTime::now().to_rfc3339(),
            service: self.service_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness() {
        let checker = HealthChecker::new("hermes-gateway");
        let response = checker.liveness();
        assert_eq!(response.status, "UP");
        assert_eq!(response.service, "hermes-gateway");
        assert_eq!(response.version, crate::VERSION);
        assert!(DateTime::parse_str(&response.timestamp).is_some());
    }

    #[test]
    fn test_readiness_follows_flag() {
        let checker = HealthChecker::new("hermes-gateway");
        assert!(!checker.readiness().is_ready());

        checker.set_ready(true);
        let response = checker.readiness();
        assert!(response.is_ready());
        assert_eq!(response.status, "READY");

        checker.set_ready(false);
        assert_eq!(checker.readiness().status, "NOT_READY");
    }
}
