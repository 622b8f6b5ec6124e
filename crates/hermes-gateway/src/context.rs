//! Per-request authentication context.
//!
//! The gateway does not authenticate anyone. It reads the session and user
//! ids the client presents and relays them to the backend, which does.

use http::HeaderMap;

use crate::error::{GatewayError, GatewayResult};
use crate::headers::{header_str, HEADER_SESSION_ID, HEADER_USER_ID};

/// Message for operations that need both the session and the user id.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Message for logout without a session id.
pub const SESSION_REQUIRED: &str = "Session ID required for logout";

/// Identity presented by the caller, derived once per inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    session_id: Option<String>,
    user_id: Option<String>,
}

impl AuthContext {
    /// Create a context from explicit values. Empty strings count as absent.
    pub fn new(session_id: Option<String>, user_id: Option<String>) -> Self {
        Self {
            session_id: session_id.filter(|s| !s.trim().is_empty()),
            user_id: user_id.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Context of a caller that presented no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Extract the context from `X-Session-Id` / `X-User-Id`.
    ///
    /// Never fails: missing or unreadable headers leave the field empty.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            session_id: header_str(headers, &HEADER_SESSION_ID).map(String::from),
            user_id: header_str(headers, &HEADER_USER_ID).map(String::from),
        }
    }

    /// The session id, if present.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The user id, if present.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether both ids are present.
    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some() && self.user_id.is_some()
    }

    /// Require a session id (logout).
    pub fn require_session(&self) -> GatewayResult<&str> {
        self.session_id()
            .ok_or_else(|| GatewayError::authentication_required(SESSION_REQUIRED))
    }

    /// Require both ids, returned as `(session_id, user_id)`.
    pub fn require_user(&self) -> GatewayResult<(&str, &str)> {
        match (self.session_id(), self.user_id()) {
            (Some(session_id), Some(user_id)) => Ok((session_id, user_id)),
            _ => Err(GatewayError::authentication_required(AUTHENTICATION_REQUIRED)),
        }
    }

    /// Session id safe for logs: the first 8 characters followed by `...`.
    pub fn redacted_session(&self) -> Option<String> {
        self.session_id().map(redact)
    }
}

fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(8).collect();
    format!("{prefix}...")
}
