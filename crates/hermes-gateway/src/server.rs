//! HTTP server: GraphQL endpoint, probes, metrics and the service index.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use async_graphql::http::GraphiQLSource;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION, USER_AGENT};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hermes_telemetry::{InFlightGuard, MetricsRegistry};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn, Instrument};

use crate::backend::{Backend, BackendClient};
use crate::config::{GatewayConfig, ServerSettings};
use crate::context::AuthContext;
use crate::error::{ErrorResponse, ServerError, ServerResult};
use crate::handlers::OperationHandlers;
use crate::headers::{header_str, new_request_id, HEADER_REQUEST_ID};
use crate::health::HealthChecker;
use crate::schema::{build_schema, GatewaySchema};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Message that replaces unexpected resolver errors in production.
pub const MASKED_ERROR_MESSAGE: &str = "Internal server error";

/// Request handling shared by every connection.
///
/// `GET /ready` answers 503 until the [`HealthChecker`] is marked ready.
/// [`GatewayServer::serve`] does that once it accepts connections; callers
/// driving [`GatewayService::handle`] themselves call
/// [`HealthChecker::set_ready`].
#[derive(Clone)]
pub struct GatewayService {
    state: Arc<ServiceState>,
}

struct ServiceState {
    schema: GatewaySchema,
    health: Arc<HealthChecker>,
    metrics: Option<MetricsRegistry>,
    settings: ServerSettings,
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("graphql_path", &self.state.settings.graphql_path)
            .field("metrics", &self.state.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl GatewayService {
    /// Create a service over a built schema.
    pub fn new(
        schema: GatewaySchema,
        health: Arc<HealthChecker>,
        metrics: Option<MetricsRegistry>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            state: Arc::new(ServiceState {
                schema,
                health,
                metrics,
                settings,
            }),
        }
    }

    /// Handle one HTTP request. Never fails; errors become JSON responses.
    pub async fn handle<B>(&self, req: Request<B>, peer: SocketAddr) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let start = Instant::now();
        let _in_flight = InFlightGuard::new();

        let request_id = header_str(req.headers(), &HEADER_REQUEST_ID)
            .map_or_else(new_request_id, ToString::to_string);
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path,
            peer = %peer,
        );

        async move {
            let mut response = self.route(req, &path, &request_id).await;

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(HEADER_REQUEST_ID.clone(), value);
            }

            info!(
                status = response.status().as_u16(),
                duration_ms = %start.elapsed().as_millis(),
                user_agent = %user_agent,
                "request completed"
            );

            response
        }
        .instrument(span)
        .await
    }

    async fn route<B>(&self, req: Request<B>, path: &str, request_id: &str) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let settings = &self.state.settings;
        let method = req.method().clone();

        if path == settings.graphql_path {
            return match method {
                Method::POST => self.graphql(req, request_id).await,
                Method::GET if settings.playground => html_response(
                    GraphiQLSource::build()
                        .endpoint(&settings.graphql_path)
                        .finish(),
                ),
                Method::GET => self.not_found(request_id),
                _ => error_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "GraphQL requests must use POST",
                    request_id,
                ),
            };
        }

        if method != Method::GET {
            return self.not_found(request_id);
        }

        match path {
            "/health" => json_response(StatusCode::OK, &self.state.health.liveness()),
            "/ready" => {
                let readiness = self.state.health.readiness();
                let status = if readiness.is_ready() {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                };
                json_response(status, &readiness)
            }
            "/metrics" => match &self.state.metrics {
                Some(registry) => text_response(
                    StatusCode::OK,
                    "text/plain; version=0.0.4",
                    registry.render(),
                ),
                None => self.not_found(request_id),
            },
            "/" => self.index(),
            _ => self.not_found(request_id),
        }
    }

    async fn graphql<B>(&self, req: Request<B>, request_id: &str) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let auth = AuthContext::from_headers(req.headers());
        let limit = self.state.settings.max_request_body_size;

        let body = match Limited::new(req.into_body(), limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<http_body_util::LengthLimitError>() => {
                warn!(limit, "Request body too large");
                return error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "request body too large",
                    request_id,
                );
            }
            Err(e) => {
                warn!(error = %e, "Failed to read request body");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "failed to read request body",
                    request_id,
                );
            }
        };

        let request: async_graphql::Request = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Invalid GraphQL request body");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("invalid GraphQL request: {e}"),
                    request_id,
                );
            }
        };

        debug!(
            operation = request.operation_name.as_deref().unwrap_or("-"),
            authenticated = auth.is_authenticated(),
            "Executing GraphQL request"
        );

        let response = self.state.schema.execute(request.data(auth)).await;

        let mut body = match serde_json::to_value(&response) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode GraphQL response");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to encode response",
                    request_id,
                );
            }
        };

        if self.state.settings.production {
            mask_internal_errors(&mut body);
        }

        json_response(StatusCode::OK, &body)
    }

    fn endpoints(&self) -> Value {
        let mut endpoints = json!({
            "graphql": self.state.settings.graphql_path,
            "health": "/health",
            "readiness": "/ready",
        });
        if self.state.metrics.is_some() {
            endpoints["metrics"] = json!("/metrics");
        }
        endpoints
    }

    fn index(&self) -> Response<Full<Bytes>> {
        if self.state.settings.playground {
            if let Ok(location) = HeaderValue::from_str(&self.state.settings.graphql_path) {
                let mut response = Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(LOCATION, location);
                return response;
            }
        }

        json_response(
            StatusCode::OK,
            &json!({
                "message": "Hermes GraphQL Gateway",
                "version": crate::VERSION,
                "endpoints": self.endpoints(),
            }),
        )
    }

    fn not_found(&self, request_id: &str) -> Response<Full<Bytes>> {
        let error = ErrorResponse::new("Not Found", "The requested endpoint does not exist")
            .with_request_id(request_id)
            .with_details(json!({ "availableEndpoints": self.endpoints() }));

        json_response(StatusCode::NOT_FOUND, &error)
    }
}

/// Replace the message of resolver errors that carry no `extensions.code`.
///
/// Request-level errors (parse, validation) have no `path` and are kept.
pub fn mask_internal_errors(body: &mut Value) {
    let Some(errors) = body.get_mut("errors").and_then(Value::as_array_mut) else {
        return;
    };

    for error in errors {
        let from_resolver = error.get("path").is_some();
        let coded = error.pointer("/extensions/code").is_some();
        if from_resolver && !coded {
            if let Some(object) = error.as_object_mut() {
                object.insert("message".to_string(), json!(MASKED_ERROR_MESSAGE));
            }
        }
    }
}

fn text_response(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn html_response(body: String) -> Response<Full<Bytes>> {
    text_response(StatusCode::OK, "text/html; charset=utf-8", body)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    text_response(status, "application/json", json)
}

fn error_response(status: StatusCode, message: &str, request_id: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse::new(status.canonical_reason().unwrap_or("Error"), message)
        .with_request_id(request_id);

    json_response(status, &error)
}

/// The gateway server.
#[derive(Debug)]
pub struct GatewayServer {
    config: GatewayConfig,
    service: GatewayService,
    health: Arc<HealthChecker>,
}

impl GatewayServer {
    /// Create a server talking to the configured REST backend.
    pub fn new(config: GatewayConfig, metrics: Option<MetricsRegistry>) -> ServerResult<Self> {
        let backend = BackendClient::new(&config.backend)?;
        info!(
            base_url = %backend.base_url(),
            timeout_ms = %backend.timeout().as_millis(),
            "Backend client configured"
        );

        Ok(Self::with_backend(config, Arc::new(backend), metrics))
    }

    /// Create a server over any backend implementation.
    pub fn with_backend(
        config: GatewayConfig,
        backend: Arc<dyn Backend>,
        metrics: Option<MetricsRegistry>,
    ) -> Self {
        let schema = build_schema(OperationHandlers::new(backend), config.server.introspection);
        let health = Arc::new(HealthChecker::new(config.telemetry.service_name.clone()));
        let service = GatewayService::new(
            schema,
            Arc::clone(&health),
            metrics,
            config.server.clone(),
        );

        Self {
            config,
            service,
            health,
        }
    }

    /// The request handler, for embedding or testing.
    pub fn service(&self) -> GatewayService {
        self.service.clone()
    }

    /// Bind the configured address and serve until SIGTERM or Ctrl-C.
    pub async fn run(self) -> ServerResult<()> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Bind the configured address and serve until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self.config.listen_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::server(format!("failed to bind {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serve connections from `listener` until `shutdown` fires, then wait
    /// for open connections up to the configured shutdown timeout.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            graphql_path = %self.config.server.graphql_path,
            "Hermes gateway listening"
        );

        let tracker = ConnectionTracker::new();
        self.health.set_ready(true);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let token = tracker.acquire();
                        let service = self.service.clone();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, peer, service, shutdown).await {
                                debug!(peer = %peer, error = %e, "Connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                },
                () = shutdown.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        self.health.set_ready(false);

        let timeout = self.config.server.shutdown_timeout;
        info!(
            timeout_ms = %timeout.as_millis(),
            connections = tracker.active_connections(),
            "Waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_drain() => info!("All connections closed"),
            () = tokio::time::sleep(timeout) => warn!(
                connections = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            ),
        }

        info!("Server stopped");
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: GatewayService,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let handler = service_fn(move |req: Request<Incoming>| {
        let service = service.clone();
        async move { Ok::<_, Infallible>(service.handle(req, peer).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, handler);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => return result,
        () = shutdown.recv() => {
            debug!(peer = %peer, "Closing connection for shutdown");
            conn.as_mut().graceful_shutdown();
        }
    }

    conn.await
}
