//! Prometheus metrics for the gateway.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_graphql_requests_total` | Counter | `operation`, `outcome` | GraphQL requests |
//! | `hermes_graphql_request_duration_seconds` | Histogram | `operation` | GraphQL latency |
//! | `hermes_backend_requests_total` | Counter | `operation`, `status` | Backend calls |
//! | `hermes_backend_request_duration_seconds` | Histogram | `operation` | Backend latency |
//! | `hermes_in_flight_requests` | Gauge | - | In-flight HTTP requests |
//!
//! The recorder is installed without its own listener; the gateway serves
//! the rendered text on `GET /metrics`.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics handle. The recorder can only be installed once per process.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for durations, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 5ms .. 30s; the upper end covers the default backend timeout
            duration_buckets: vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        }
    }
}

/// Handle for rendering collected metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with the given handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    ///
    /// No upkeep task runs in the background, so histogram upkeep happens here.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.run_upkeep();
        self.handle.render()
    }
}

/// Initializes the metrics subsystem.
///
/// Returns `None` when metrics are disabled. Calling this again after a
/// successful install returns the existing registry.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(Some(MetricsRegistry::new(handle.clone())));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();

    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "hermes_graphql_requests_total",
        "Total number of GraphQL requests by operation and outcome"
    );
    describe_histogram!(
        "hermes_graphql_request_duration_seconds",
        "GraphQL request duration in seconds"
    );
    describe_counter!(
        "hermes_backend_requests_total",
        "Total number of backend REST calls by operation and status"
    );
    describe_histogram!(
        "hermes_backend_request_duration_seconds",
        "Backend REST call duration in seconds"
    );
    describe_gauge!(
        "hermes_in_flight_requests",
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed GraphQL request.
///
/// `outcome` is `"ok"` or `"error"`.
pub fn record_graphql_request(operation: &str, outcome: &str, duration: Duration) {
    counter!(
        "hermes_graphql_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "hermes_graphql_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a backend call.
///
/// `status` is the HTTP status, or `None` when no response was received.
pub fn record_backend_call(operation: &str, status: Option<u16>, duration: Duration) {
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());

    counter!(
        "hermes_backend_requests_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "hermes_backend_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Guard that tracks an in-flight request for its lifetime.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!("hermes_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("hermes_in_flight_requests").decrement(1.0);
    }
}
