//! Register, login and logout shapes.

use async_graphql::ID;
use serde_json::Value;

use crate::backend::{AuthPayload, BackendUser, LoginRequest, RegisterRequest, SuccessPayload};
use crate::model::{
    AuthResponse, ClientInfoInput, DateTime, GenericResponse, LoginInput, RegisterInput, User,
};

/// Client IP reported when the caller supplies none.
pub const DEFAULT_CLIENT_IP: &str = "127.0.0.1";

/// User agent reported when the caller supplies none.
pub const DEFAULT_CLIENT_USER_AGENT: &str = "GraphQL-Client/1.0.0";

/// Resolved client information for register/login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Forwarded as `X-Forwarded-For`.
    pub ip_address: String,
    /// Forwarded as `User-Agent`.
    pub user_agent: String,
}

impl ClientInfo {
    /// Apply defaults to optional GraphQL client info. Empty values count as
    /// absent.
    pub fn from_input(input: Option<&ClientInfoInput>) -> Self {
        let pick = |value: Option<&String>, default: &str| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            ip_address: pick(input.and_then(|i| i.ip_address.as_ref()), DEFAULT_CLIENT_IP),
            user_agent: pick(
                input.and_then(|i| i.user_agent.as_ref()),
                DEFAULT_CLIENT_USER_AGENT,
            ),
        }
    }
}

/// `RegisterInput` to the backend body.
pub fn register_request(input: &RegisterInput) -> RegisterRequest {
    RegisterRequest {
        username: input.username.clone(),
        email: input.email.clone(),
        password: input.password.clone(),
    }
}

/// `LoginInput` to the backend body.
pub fn login_request(input: &LoginInput) -> LoginRequest {
    LoginRequest {
        username: input.username.clone(),
        password: input.password.clone(),
    }
}

/// Backend auth payload plus header ids to `AuthResponse`.
pub fn auth_response(auth: AuthPayload) -> AuthResponse {
    AuthResponse {
        success: auth.payload.success,
        message: auth.payload.message,
        data: auth.payload.data.as_ref().and_then(user),
        session_id: auth.session_id,
        user_id: auth.user_id,
    }
}

/// Map a backend user object. Anything but an object yields `None`.
pub fn user(value: &Value) -> Option<User> {
    if !value.is_object() {
        return None;
    }
    let backend: BackendUser = serde_json::from_value(value.clone()).ok()?;

    Some(User {
        id: ID(backend.id.unwrap_or_default()),
        username: backend.username.unwrap_or_default(),
        email: backend.email,
        created_at: DateTime::from_json(&backend.created_at),
    })
}

/// Logout payload to `GenericResponse`.
pub fn generic_response(payload: SuccessPayload<Value>) -> GenericResponse {
    GenericResponse {
        success: payload.success,
        message: payload.message,
        data: payload.data.as_ref().and_then(text),
    }
}

/// Render a JSON value as text: strings verbatim, `null` as absent,
/// anything else as compact JSON.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
