//! GraphQL object and input types.
//!
//! Field names are exposed in camelCase. Timestamps coming from the backend
//! are nullable: the gateway relays them without validating them.

mod datetime;

pub use datetime::DateTime;

use async_graphql::{InputObject, SimpleObject, ID};

/// A registered user.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct User {
    /// User id.
    pub id: ID,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: Option<String>,
    /// Account creation time.
    pub created_at: Option<DateTime>,
}

/// Result of register and login.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct AuthResponse {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    pub message: String,
    /// Set on register; login returns no user object.
    pub data: Option<User>,
    /// Session id for subsequent requests.
    pub session_id: Option<String>,
    /// User id for subsequent requests.
    pub user_id: Option<String>,
}

/// A message as returned by `sendMessage`.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Message {
    /// Conversation thread.
    pub thread_id: String,
    /// Sender username.
    pub sender: String,
    /// Message text.
    pub content: String,
    /// Send time.
    pub timestamp: Option<DateTime>,
}

/// A stored message in a conversation history.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct MessageDto {
    /// Message id.
    pub id: ID,
    /// Conversation thread.
    pub thread_id: String,
    /// Sender id.
    pub sender_id: String,
    /// Sender username.
    pub sender_username: String,
    /// Message text.
    pub content: String,
    /// Time of the event.
    pub timestamp: Option<DateTime>,
}

/// Result of `sendMessage`.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct MessageResponse {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    pub message: String,
    /// Payload, absent when the backend sent none.
    pub data: Option<Message>,
}

/// One page of a conversation.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct MessageHistory {
    /// Messages on this page.
    pub data: Vec<MessageDto>,
    /// Total messages in the conversation.
    pub total: i32,
    /// Page size.
    pub limit: i32,
    /// Offset of the first message.
    pub offset: i32,
}

/// Result of `getMessageHistory`.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct MessageHistoryResponse {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    pub message: String,
    /// Payload, absent when the backend sent none.
    pub data: Option<MessageHistory>,
}

/// One entry of the caller's activity log.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct ActivityLog {
    /// `{userId}-{timestamp}`.
    pub id: ID,
    /// Owner of the entry.
    pub user_id: String,
    /// Backend action, `UNKNOWN` when absent.
    pub activity_type: String,
    /// `{action} - Success|Failed[: reason]`.
    pub description: String,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Time of the event.
    pub timestamp: Option<DateTime>,
    /// Compact JSON with `successful` and `failureReason`.
    pub metadata: Option<String>,
}

/// One page of activity logs.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct ActivityPage {
    /// Entries on this page.
    pub activities: Vec<ActivityLog>,
    /// Total entries.
    pub total_elements: i32,
    /// Number of pages at this page size.
    pub total_pages: i32,
    /// Requested page.
    pub current_page: i32,
    /// Requested page size.
    pub page_size: i32,
}

/// Result of `getMyActivityLogs`.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct ActivityResponse {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    pub message: String,
    /// Payload, absent when the backend sent none.
    pub data: Option<ActivityPage>,
}

/// Backend health as seen through the gateway.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct HealthStatus {
    /// `UP`/`DOWN` or `READY`/`NOT_READY`.
    pub status: String,
    /// When the check ran.
    pub timestamp: DateTime,
    /// Backend document or failure reason.
    pub details: Option<String>,
}

/// Envelope for operations without a typed payload.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct GenericResponse {
    /// Backend success flag.
    pub success: bool,
    /// Backend message.
    pub message: String,
    /// Payload rendered as text.
    pub data: Option<String>,
}

/// User registration input data
#[derive(Debug, Clone, InputObject)]
pub struct RegisterInput {
    /// Username for the new user
    pub username: String,
    /// Email address for the new user
    pub email: String,
    /// Password for the new user
    pub password: String,
}

/// User login input data
#[derive(Debug, Clone, InputObject)]
pub struct LoginInput {
    /// Username or email for login
    pub username: String,
    /// User password
    pub password: String,
}

/// Message sending input data
#[derive(Debug, Clone, InputObject)]
pub struct SendMessageInput {
    /// Username of the message recipient
    pub receiver_username: String,
    /// Message content to send
    pub content: String,
}

/// Pagination parameters
#[derive(Debug, Clone, Default, InputObject)]
pub struct PaginationInput {
    /// Page number (0-based)
    #[graphql(default_with = "Some(0)")]
    pub page: Option<i32>,
    /// Number of items per page
    #[graphql(default_with = "Some(20)")]
    pub size: Option<i32>,
}

/// Client information for tracking
#[derive(Debug, Clone, Default, InputObject)]
pub struct ClientInfoInput {
    /// Client IP address
    pub ip_address: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}
