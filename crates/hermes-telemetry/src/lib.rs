//! Observability for the Hermes gateway.
//!
//! - **Logging**: structured JSON (or pretty) output through `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate, rendered
//!   by the gateway on `GET /metrics`
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("hermes-gateway")
//!     .build();
//!
//! let metrics = init_telemetry(&config)?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, InFlightGuard, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// Returns the metrics registry when metrics are enabled.
///
/// # Errors
///
/// Returns `TelemetryError` if any subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(&config.logging)?;
    let registry = init_metrics(&config.metrics)?;

    tracing::debug!(
        service = %config.service_name,
        version = %config.service_version,
        metrics = registry.is_some(),
        "Telemetry initialized"
    );

    Ok(registry)
}
