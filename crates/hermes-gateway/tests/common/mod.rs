//! Shared fixtures for the integration tests.
//!
//! - [`MockRestApi`]: a throwaway hyper server standing in for the REST backend.
//! - [`FakeBackend`]: an in-memory [`Backend`] that records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use hermes_gateway::backend::{
    ActivityLogPage, AuthPayload, Backend, BackendMessage, BackendResult, LoginRequest,
    MessagePage, RegisterRequest, SendMessageRequest, SuccessPayload,
};
use hermes_gateway::config::BackendSettings;
use hermes_gateway::{BackendClient, StructuredError};

// ---------------------------------------------------------------------------
// Mock REST API
// ---------------------------------------------------------------------------

/// A request received by the mock REST API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A canned response served for one path.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json")],
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type", "text/plain")],
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// Hyper server on `127.0.0.1:0` answering by path and recording requests.
pub struct MockRestApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockRestApi {
    pub async fn start(routes: Vec<(&'static str, Canned)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<&'static str, Canned>> = Arc::new(routes.into_iter().collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    continue;
                };
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let routes = Arc::clone(&routes);
                        let recorded = Arc::clone(&recorded);
                        async move { Ok::<_, Infallible>(respond(req, &routes, &recorded).await) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at this server.
    pub fn client(&self) -> BackendClient {
        let settings = BackendSettings {
            base_url: self.url(),
            timeout: Duration::from_secs(5),
            ..BackendSettings::default()
        };
        BackendClient::new(&settings).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The only request received so far.
    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected one request, got {requests:?}");
        requests.into_iter().next().unwrap()
    }
}

impl Drop for MockRestApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    req: Request<Incoming>,
    routes: &HashMap<&'static str, Canned>,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.unwrap().to_bytes();

    recorded.lock().unwrap().push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(ToString::to_string),
        headers: parts.headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let canned = routes
        .get(parts.uri.path())
        .cloned()
        .unwrap_or_else(|| Canned::json(404, json!({"message": "no such route"})));

    let mut builder = Response::builder().status(StatusCode::from_u16(canned.status).unwrap());
    for (name, value) in canned.headers {
        builder = builder.header(name, value);
    }
    builder.body(Full::new(Bytes::from(canned.body))).unwrap()
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// A call received by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register {
        username: String,
        ip_address: String,
        user_agent: String,
    },
    Login {
        username: String,
        ip_address: String,
        user_agent: String,
    },
    Logout {
        session_id: String,
    },
    SendMessage {
        recipient: String,
        content: String,
        session_id: String,
        user_id: String,
    },
    MessageHistory {
        username: String,
        session_id: String,
        user_id: String,
        limit: i64,
        offset: i64,
    },
    ActivityLogs {
        session_id: String,
        user_id: String,
        page: i64,
        size: i64,
    },
    Health,
    Readiness,
}

/// Records calls and answers with fixed payloads, or with `failure` when set.
#[derive(Debug, Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    failure: Option<StructuredError>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(error: StructuredError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(error),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> BackendResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// The activity page used throughout the tests.
pub fn sample_activity_page() -> ActivityLogPage {
    serde_json::from_value(json!({
        "data": [{
            "action": "LOGIN",
            "successful": true,
            "timestamp": 123,
            "ipAddress": "1.2.3.4",
            "userAgent": "agent",
            "failureReason": null
        }],
        "total": 1
    }))
    .unwrap()
}

#[async_trait]
impl Backend for FakeBackend {
    async fn register(
        &self,
        user: &RegisterRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload> {
        self.record(Call::Register {
            username: user.username.clone(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
        })?;

        Ok(AuthPayload {
            payload: SuccessPayload::ok(
                "User registered successfully",
                Some(json!({"id": "user-1", "username": user.username, "email": user.email})),
            ),
            session_id: None,
            user_id: None,
        })
    }

    async fn login(
        &self,
        credentials: &LoginRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload> {
        self.record(Call::Login {
            username: credentials.username.clone(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
        })?;

        Ok(AuthPayload {
            payload: SuccessPayload::ok(
                "Login successful",
                Some(json!({"id": "user-1", "username": credentials.username})),
            ),
            session_id: Some("session-abcdef123456".to_string()),
            user_id: Some("user-1".to_string()),
        })
    }

    async fn logout(&self, session_id: &str) -> BackendResult<SuccessPayload<Value>> {
        self.record(Call::Logout {
            session_id: session_id.to_string(),
        })?;
        Ok(SuccessPayload::ok("Logged out", None))
    }

    async fn send_message(
        &self,
        message: &SendMessageRequest,
        session_id: &str,
        user_id: &str,
    ) -> BackendResult<SuccessPayload<BackendMessage>> {
        self.record(Call::SendMessage {
            recipient: message.recipient.clone(),
            content: message.content.clone(),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
        })?;

        let sent = BackendMessage {
            id: Some("msg-1".to_string()),
            thread_id: Some("thread-1".to_string()),
            sender: Some(user_id.to_string()),
            content: Some(message.content.clone()),
            timestamp: json!("2024-05-01T10:00:00Z"),
            ..BackendMessage::default()
        };
        Ok(SuccessPayload::ok("Message sent", Some(sent)))
    }

    async fn get_message_history(
        &self,
        username: &str,
        session_id: &str,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> BackendResult<SuccessPayload<MessagePage>> {
        self.record(Call::MessageHistory {
            username: username.to_string(),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            limit,
            offset,
        })?;

        let page = MessagePage {
            data: vec![BackendMessage {
                id: Some("msg-7".to_string()),
                thread_id: Some("thread-1".to_string()),
                sender_id: Some("user-2".to_string()),
                sender_username: Some(username.to_string()),
                content: Some("hi".to_string()),
                timestamp: json!(1_714_557_600_000_i64),
                ..BackendMessage::default()
            }],
            total: 42,
            limit,
            offset,
        };
        Ok(SuccessPayload::ok("History retrieved", Some(page)))
    }

    async fn get_activity_logs(
        &self,
        session_id: &str,
        user_id: &str,
        page: i64,
        size: i64,
    ) -> BackendResult<SuccessPayload<ActivityLogPage>> {
        self.record(Call::ActivityLogs {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            page,
            size,
        })?;
        Ok(SuccessPayload::ok(
            "Activities retrieved",
            Some(sample_activity_page()),
        ))
    }

    async fn get_health(&self) -> BackendResult<Value> {
        self.record(Call::Health)?;
        Ok(json!({"status": "UP", "components": {"db": "UP"}}))
    }

    async fn get_readiness(&self) -> BackendResult<Value> {
        self.record(Call::Readiness)?;
        Ok(json!({}))
    }
}
