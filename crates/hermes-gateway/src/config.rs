//! Configuration for the Hermes gateway.

use std::path::PathBuf;
use std::time::Duration;

use hermes_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// REST backend settings.
    pub backend: BackendSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
}

impl GatewayConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Load configuration from a file.
    pub fn from_file(path: impl Into<PathBuf>) -> ServerResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ServerError::config(format!("failed to read config file: {e}")))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            "toml" => toml::from_str(&content)
                .map_err(|e| ServerError::config(format!("invalid TOML: {e}"))),
            "json" => serde_json::from_str(&content)
                .map_err(|e| ServerError::config(format!("invalid JSON: {e}"))),
            _ => Err(ServerError::config(format!(
                "unsupported config format: {extension}"
            ))),
        }
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored and leave the current setting in place.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("HERMES_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        // HERMES_LISTEN_PORT wins over the generic PORT
        for key in ["PORT", "HERMES_LISTEN_PORT"] {
            if let Some(port) = lookup(key).and_then(|v| v.trim().parse().ok()) {
                self.server.listen_port = port;
            }
        }

        if let Some(enabled) = lookup("GRAPHQL_INTROSPECTION").and_then(|v| parse_bool(&v)) {
            self.server.introspection = enabled;
        }

        if let Some(enabled) = lookup("GRAPHQL_PLAYGROUND").and_then(|v| parse_bool(&v)) {
            self.server.playground = enabled;
        }

        for key in ["NODE_ENV", "HERMES_ENV"] {
            if let Some(env) = lookup(key) {
                self.server.production = env.trim().eq_ignore_ascii_case("production");
            }
        }

        if let Some(url) = lookup("REST_API_BASE_URL") {
            self.backend.base_url = url;
        }

        if let Some(millis) = lookup("REST_API_TIMEOUT").and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.backend.timeout = Duration::from_millis(millis);
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.telemetry.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            self.telemetry.log_format = format;
        }

        if let Some(enabled) = lookup("HERMES_METRICS_ENABLED").and_then(|v| parse_bool(&v)) {
            self.telemetry.metrics_enabled = enabled;
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ServerResult<()> {
        if self.backend.base_url.is_empty() {
            return Err(ServerError::config("backend.base_url is required"));
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(ServerError::config(
                "backend.base_url must start with http:// or https://",
            ));
        }

        if self.backend.timeout.is_zero() {
            return Err(ServerError::config("backend.timeout must be greater than zero"));
        }

        if self.server.listen_port == 0 {
            return Err(ServerError::config("server.listen_port must be non-zero"));
        }

        if !self.server.graphql_path.starts_with('/') {
            return Err(ServerError::config("server.graphql_path must start with /"));
        }

        LogConfig::default()
            .with_format(&self.telemetry.log_format)
            .map_err(|e| ServerError::config(e.to_string()))?;

        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.listen_port)
    }

    /// Derive the telemetry crate configuration.
    pub fn to_telemetry_config(&self) -> ServerResult<TelemetryConfig> {
        let logging = LogConfig::production()
            .with_level(self.telemetry.log_level.clone())
            .with_format(&self.telemetry.log_format)?;

        let metrics = MetricsConfig {
            enabled: self.telemetry.metrics_enabled,
            ..MetricsConfig::default()
        };

        Ok(TelemetryConfig::builder()
            .service_name(&self.telemetry.service_name)
            .service_version(crate::VERSION)
            .logging(logging)
            .metrics(metrics)
            .build())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub listen_addr: String,
    /// Port the gateway listens on.
    pub listen_port: u16,
    /// Maximum request body size in bytes.
    pub max_request_body_size: usize,
    /// Path of the GraphQL endpoint.
    pub graphql_path: String,
    /// Allow schema introspection queries.
    pub introspection: bool,
    /// Serve the GraphQL playground on `GET {graphql_path}`.
    pub playground: bool,
    /// Mask internal error messages in responses.
    pub production: bool,
    /// How long to wait for open connections on shutdown.
    #[serde(with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 4000,
            max_request_body_size: 10 * 1024 * 1024, // 10MB
            graphql_path: "/graphql".to_string(),
            introspection: false,
            playground: false,
            production: false,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// REST backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the messaging REST API.
    pub base_url: String,
    /// Per-request timeout.
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
    /// Idle connections kept per backend host.
    pub pool_max_idle_per_host: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_millis(30_000),
            pool_max_idle_per_host: 100,
        }
    }
}

/// Telemetry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Service name for telemetry.
    pub service_name: String,
    /// Log level or filter directive.
    pub log_level: String,
    /// `json` or `pretty`.
    pub log_format: String,
    /// Expose Prometheus metrics on `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: "hermes-gateway".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            metrics_enabled: true,
        }
    }
}

/// Builder for `GatewayConfig`.
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    /// Set the listen port.
    #[must_use]
    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.server.listen_port = port;
        self
    }

    /// Set the listen address.
    #[must_use]
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server.listen_addr = addr.into();
        self
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    /// Set the backend timeout.
    #[must_use]
    pub fn backend_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.timeout = timeout;
        self
    }

    /// Enable or disable introspection.
    #[must_use]
    pub fn introspection(mut self, enabled: bool) -> Self {
        self.config.server.introspection = enabled;
        self
    }

    /// Enable or disable the playground.
    #[must_use]
    pub fn playground(mut self, enabled: bool) -> Self {
        self.config.server.playground = enabled;
        self
    }

    /// Enable or disable production error masking.
    #[must_use]
    pub fn production(mut self, enabled: bool) -> Self {
        self.config.server.production = enabled;
        self
    }

    /// Set the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.telemetry.service_name = name.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerResult<GatewayConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Duration (de)serialization with `ms`, `s`, `m` and `h` suffixes.
mod duration_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let (number, unit_millis) = if let Some(n) = s.strip_suffix("ms") {
            (n, 1)
        } else if let Some(n) = s.strip_suffix('s') {
            (n, 1_000)
        } else if let Some(n) = s.strip_suffix('m') {
            (n, 60_000)
        } else if let Some(n) = s.strip_suffix('h') {
            (n, 3_600_000)
        } else {
            // Bare numbers are milliseconds, like REST_API_TIMEOUT
            (s, 1)
        };

        let n: u64 = number
            .trim()
            .parse()
            .map_err(|_| format!("invalid duration: {s}"))?;
        n.checked_mul(unit_millis)
            .map(Duration::from_millis)
            .ok_or_else(|| format!("duration out of range: {s}"))
    }
}
