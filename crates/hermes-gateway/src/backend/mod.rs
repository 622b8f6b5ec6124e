//! REST backend access.
//!
//! [`Backend`] is the capability the operation handlers depend on;
//! [`BackendClient`] implements it over HTTP. Every failure is normalized
//! into a [`StructuredError`] before it leaves this module.

mod client;
mod payload;
mod request;

pub use client::BackendClient;
pub use payload::{
    ActivityEntry, ActivityLogPage, AuthPayload, BackendMessage, BackendUser, LoginRequest,
    MessagePage, RegisterRequest, SendMessageRequest, SuccessPayload,
};
pub use request::BackendRequest;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StructuredError;

/// Result of a backend call.
pub type BackendResult<T> = Result<T, StructuredError>;

/// Operations offered by the REST messaging backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/auth/register`.
    async fn register(
        &self,
        user: &RegisterRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload>;

    /// `POST /api/auth/login`.
    async fn login(
        &self,
        credentials: &LoginRequest,
        ip_address: &str,
        user_agent: &str,
    ) -> BackendResult<AuthPayload>;

    /// `POST /api/auth/logout`.
    async fn logout(&self, session_id: &str) -> BackendResult<SuccessPayload<Value>>;

    /// `POST /api/messages/send`.
    async fn send_message(
        &self,
        message: &SendMessageRequest,
        session_id: &str,
        user_id: &str,
    ) -> BackendResult<SuccessPayload<BackendMessage>>;

    /// `GET /api/messages/history`.
    async fn get_message_history(
        &self,
        username: &str,
        session_id: &str,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> BackendResult<SuccessPayload<MessagePage>>;

    /// `GET /api/activities/logs`.
    async fn get_activity_logs(
        &self,
        session_id: &str,
        user_id: &str,
        page: i64,
        size: i64,
    ) -> BackendResult<SuccessPayload<ActivityLogPage>>;

    /// `GET /api/health`, raw document.
    async fn get_health(&self) -> BackendResult<Value>;

    /// `GET /api/ready`, raw document.
    async fn get_readiness(&self) -> BackendResult<Value>;
}
