//! Wire types of the REST backend.
//!
//! Successful responses use the envelope `{success, message, data}`. The
//! health endpoints do not and are read as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success envelope of the REST backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessPayload<T> {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    #[serde(default)]
    pub message: String,
    /// Operation payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> SuccessPayload<T> {
    /// Create a successful payload.
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Register/login result: the envelope plus the ids taken from response
/// headers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPayload {
    /// Backend envelope. `data` is a user object on register and a plain
    /// string on login.
    pub payload: SuccessPayload<Value>,
    /// Session id from `x-session-id` (or `x-session-token`).
    pub session_id: Option<String>,
    /// User id from `x-user-id`.
    pub user_id: Option<String>,
}

/// `POST /api/auth/register` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Requested username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain password, hashed by the backend.
    pub password: String,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    /// Password.
    pub password: String,
}

/// `POST /api/messages/send` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Recipient username.
    pub recipient: String,
    /// Message text.
    pub content: String,
}

/// User as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendUser {
    /// User id.
    pub id: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Email, when the backend exposes it.
    pub email: Option<String>,
    /// Creation time, ISO string or epoch millis.
    pub created_at: Value,
}

/// Message as returned by the backend.
///
/// The send endpoint returns `sender`; stored messages may carry
/// `senderId`/`senderUsername` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendMessage {
    /// Message id.
    pub id: Option<String>,
    /// Conversation thread.
    pub thread_id: Option<String>,
    /// Sender username.
    pub sender: Option<String>,
    /// Sender id.
    pub sender_id: Option<String>,
    /// Sender username.
    pub sender_username: Option<String>,
    /// Message text.
    pub content: Option<String>,
    /// Send time.
    pub timestamp: Value,
}

/// One page of message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePage {
    /// Messages on this page.
    pub data: Vec<BackendMessage>,
    /// Total messages in the conversation.
    pub total: i64,
    /// Page size used by the backend.
    pub limit: i64,
    /// Offset used by the backend.
    pub offset: i64,
}

/// One activity log entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEntry {
    /// Activity kind, e.g. `LOGIN`.
    pub action: Option<String>,
    /// Whether the action succeeded.
    pub successful: bool,
    /// When it happened.
    pub timestamp: Value,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Why the action failed.
    pub failure_reason: Option<String>,
}

/// One page of activity logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogPage {
    /// Entries on this page.
    pub data: Vec<ActivityEntry>,
    /// Total entries.
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_requires_success_flag() {
        let ok: SuccessPayload<Value> =
            serde_json::from_value(json!({"success": true, "message": "Logged out"})).unwrap();
        assert!(ok.success);
        assert!(ok.data.is_none());

        let missing = serde_json::from_value::<SuccessPayload<Value>>(json!({"message": "?"}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_typed_data_is_validated() {
        let wrong = serde_json::from_value::<SuccessPayload<MessagePage>>(json!({
            "success": true,
            "message": "ok",
            "data": "not a page"
        }));
        assert!(wrong.is_err());
    }

    #[test]
    fn test_activity_entry_camel_case() {
        let entry: ActivityEntry = serde_json::from_value(json!({
            "action": "LOGIN",
            "successful": false,
            "timestamp": "2024-05-01T10:00:00",
            "ipAddress": "1.2.3.4",
            "userAgent": "agent",
            "failureReason": "Invalid password"
        }))
        .unwrap();

        assert_eq!(entry.ip_address.as_deref(), Some("1.2.3.4"));
        assert_eq!(entry.failure_reason.as_deref(), Some("Invalid password"));
        assert!(!entry.successful);
    }

    #[test]
    fn test_message_page_defaults() {
        let page: MessagePage = serde_json::from_value(json!({
            "data": [{"threadId": "t1", "sender": "alice", "content": "hi"}]
        }))
        .unwrap();

        assert_eq!(page.total, 0);
        assert_eq!(page.data[0].sender.as_deref(), Some("alice"));
        assert!(page.data[0].timestamp.is_null());
    }

    #[test]
    fn test_request_bodies() {
        let body = serde_json::to_value(SendMessageRequest {
            recipient: "bob".into(),
            content: "hello".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"recipient": "bob", "content": "hello"}));
    }
}
