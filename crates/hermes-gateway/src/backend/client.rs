//! HTTP client for the REST messaging backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::payload::{
    ActivityLogPage, AuthPayload, BackendMessage, LoginRequest, MessagePage, RegisterRequest,
    SendMessageRequest, SuccessPayload,
};
use super::request::BackendRequest;
use super::{Backend, BackendResult};
use crate::config::BackendSettings;
use crate::error::{ServerError, ServerResult, StructuredError};
use crate::headers::{
    header_str, sanitize_headers, CLIENT_USER_AGENT, HEADER_SESSION_ID, HEADER_SESSION_TOKEN,
    HEADER_USER_ID,
};

/// HTTP client for the REST backend.
///
/// Holds one connection pool; clone it or share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client.
    client: Client,
    /// Backend base URL.
    base_url: String,
    /// Request timeout.
    timeout: Duration,
}

/// Buffered backend response.
#[derive(Debug)]
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl BackendClient {
    /// Create a new backend client.
    pub fn new(settings: &BackendSettings) -> ServerResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(settings.timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .build()
            .map_err(|e| ServerError::server(format!("failed to create backend client: {e}")))?;

        tracing::info!(
            base_url = %settings.base_url,
            timeout_ms = u64::try_from(settings.timeout.as_millis()).unwrap_or(u64::MAX),
            "Backend client initialized"
        );

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
        })
    }

    /// Get the backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a request and buffer the response.
    ///
    /// Transport failures and non-2xx statuses become `StructuredError`s.
    async fn send(&self, operation: &str, request: BackendRequest) -> BackendResult<RawResponse> {
        let url = request.url(&self.base_url);

        tracing::debug!(
            operation,
            method = %request.method,
            url = %url,
            query = ?request.query,
            headers = ?sanitize_headers(&request.headers),
            "Backend request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                hermes_telemetry::metrics::record_backend_call(operation, None, start.elapsed());
                let error = StructuredError::transport(operation, &transport_message(&e));
                log_error(&error);
                return Err(error);
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await;
        hermes_telemetry::metrics::record_backend_call(operation, Some(status), start.elapsed());

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                let error = StructuredError::new(
                    operation,
                    Some(status),
                    Value::Null,
                    Some(&transport_message(&e)),
                );
                log_error(&error);
                return Err(error);
            }
        };

        tracing::debug!(
            operation,
            status,
            headers = ?sanitize_headers(&headers),
            body_bytes = body.len(),
            "Backend response"
        );

        if !(200..300).contains(&status) {
            let details = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
            let fallback = format!("Request failed with status code {status}");
            let error = StructuredError::new(operation, Some(status), details, Some(&fallback));
            log_error(&error);
            return Err(error);
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Execute a request and decode the 2xx body.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: BackendRequest,
    ) -> BackendResult<(T, HeaderMap)> {
        let raw = self.send(operation, request).await?;
        let decoded = decode(operation, &raw)?;
        Ok((decoded, raw.headers))
    }

    async fn authenticate<B: Serialize + Sync>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload> {
        let request = BackendRequest::post(path)
            .with_client(ip_address, user_agent)
            .with_body(encode(operation, body)?);

        let (payload, headers): (SuccessPayload<Value>, _) = self.call(operation, request).await?;

        let session_id = header_str(&headers, &HEADER_SESSION_ID)
            .or_else(|| header_str(&headers, &HEADER_SESSION_TOKEN))
            .map(String::from);
        let user_id = header_str(&headers, &HEADER_USER_ID).map(String::from);

        Ok(AuthPayload {
            payload,
            session_id,
            user_id,
        })
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn register(
        &self,
        user: &RegisterRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload> {
        self.authenticate("register", "/api/auth/register", user, ip_address, user_agent)
            .await
    }

    async fn login(
        &self,
        credentials: &LoginRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload> {
        self.authenticate("login", "/api/auth/login", credentials, ip_address, user_agent)
            .await
    }

    async fn logout(&self, session_id: &str) -> BackendResult<SuccessPayload<Value>> {
        let request = BackendRequest::post("/api/auth/logout")
            .with_session(session_id)
            .with_body(Value::Object(serde_json::Map::new()));

        Ok(self.call("logout", request).await?.0)
    }

    async fn send_message(
        &self,
        message: &SendMessageRequest,
        session_id: &str,
        user_id: &str,
    ) -> BackendResult<SuccessPayload<BackendMessage>> {
        let request = BackendRequest::post("/api/messages/send")
            .with_auth(session_id, user_id)
            .with_body(encode("sendMessage", message)?);

        Ok(self.call("sendMessage", request).await?.0)
    }

    async fn get_message_history(
        &self,
        username: &str,
        session_id: &str,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> BackendResult<SuccessPayload<MessagePage>> {
        let request = BackendRequest::get("/api/messages/history")
            .with_query("username", username)
            .with_query("limit", limit)
            .with_query("offset", offset)
            .with_auth(session_id, user_id);

        Ok(self.call("getMessageHistory", request).await?.0)
    }

    async fn get_activity_logs(
        &self,
        session_id: &str,
        user_id: &str,
        page: i64,
        size: i64,
    ) -> BackendResult<SuccessPayload<ActivityLogPage>> {
        let request = BackendRequest::get("/api/activities/logs")
            .with_query("page", page)
            .with_query("size", size)
            .with_auth(session_id, user_id);

        Ok(self.call("getActivityLogs", request).await?.0)
    }

    async fn get_health(&self) -> BackendResult<Value> {
        Ok(self
            .call("getHealth", BackendRequest::get("/api/health"))
            .await?
            .0)
    }

    async fn get_readiness(&self) -> BackendResult<Value> {
        Ok(self
            .call("getReadiness", BackendRequest::get("/api/ready"))
            .await?
            .0)
    }
}

fn decode<T: DeserializeOwned>(operation: &str, raw: &RawResponse) -> BackendResult<T> {
    serde_json::from_slice(&raw.body).map_err(|e| {
        let error = StructuredError::malformed(operation, raw.status, &e.to_string());
        log_error(&error);
        error
    })
}

fn encode<B: Serialize + ?Sized>(operation: &str, body: &B) -> BackendResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        StructuredError::transport(operation, &format!("failed to encode request body: {e}"))
    })
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timed out: {error}")
    } else if error.is_connect() {
        format!("Connection failed: {error}")
    } else {
        error.to_string()
    }
}

fn log_error(error: &StructuredError) {
    tracing::error!(
        operation = %error.operation,
        status = error.http_status,
        code = %error.error_code,
        message = %error.human_message,
        details = %error.raw_details,
        "Backend call failed"
    );
}
