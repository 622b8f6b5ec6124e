//! Outbound request description.

use http::header::{HeaderMap, HeaderName, USER_AGENT};
use http::Method;
use serde_json::Value;

use crate::headers::{insert_header, HEADER_FORWARDED_FOR, HEADER_SESSION_ID, HEADER_USER_ID};

/// A single call to the REST backend. Built fresh per call.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the backend base URL, e.g. `/api/auth/login`.
    pub path: String,
    /// Query parameters, in the order they are sent.
    pub query: Vec<(String, String)>,
    /// Per-call headers. Client-wide defaults are added by the client.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<Value>,
}

impl BackendRequest {
    /// Create a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header. Values that are not valid header text are dropped.
    #[must_use]
    pub fn with_header(mut self, name: &HeaderName, value: &str) -> Self {
        insert_header(&mut self.headers, name, value);
        self
    }

    /// Attach the session id.
    #[must_use]
    pub fn with_session(self, session_id: &str) -> Self {
        self.with_header(&HEADER_SESSION_ID, session_id)
    }

    /// Attach the session and user ids.
    #[must_use]
    pub fn with_auth(self, session_id: &str, user_id: &str) -> Self {
        self.with_session(session_id)
            .with_header(&HEADER_USER_ID, user_id)
    }

    /// Forward the caller's IP and user agent.
    ///
    /// The user agent replaces the client-wide default for this call.
    #[must_use]
    pub fn with_client(self, ip_address: &str, user_agent: &str) -> Self {
        self.with_header(&HEADER_FORWARDED_FOR, ip_address)
            .with_header(&USER_AGENT, user_agent)
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Full URL for the given base.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}
