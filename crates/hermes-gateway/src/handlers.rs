//! One handler per GraphQL operation.
//!
//! Each handler checks the auth context it needs, builds the backend request
//! through the transformers, calls the backend and reshapes the result.
//! Failures are logged and returned unchanged; health and readiness absorb
//! them instead.

use std::sync::Arc;
use std::time::Instant;

use hermes_telemetry::metrics::record_graphql_request;

use crate::backend::Backend;
use crate::context::AuthContext;
use crate::error::{GatewayError, GatewayResult};
use crate::model::{
    ActivityResponse, AuthResponse, ClientInfoInput, DateTime, GenericResponse, HealthStatus,
    LoginInput, MessageHistoryResponse, MessageResponse, PaginationInput, RegisterInput,
    SendMessageInput,
};
use crate::transform::{activity, auth, health, message, ClientInfo, Pagination, Probe};

/// Operation handlers over a shared backend.
#[derive(Clone)]
pub struct OperationHandlers {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for OperationHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandlers").finish_non_exhaustive()
    }
}

impl OperationHandlers {
    /// Create handlers over the given backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// `register` mutation.
    pub async fn register(
        &self,
        input: &RegisterInput,
        client: Option<&ClientInfoInput>,
    ) -> GatewayResult<AuthResponse> {
        let start = Instant::now();
        tracing::info!(username = %input.username, email = %input.email, "Register user request");

        let client = ClientInfo::from_input(client);
        let result = self
            .backend
            .register(
                &auth::register_request(input),
                &client.ip_address,
                &client.user_agent,
            )
            .await
            .map(auth::auth_response)
            .map_err(GatewayError::from);

        match &result {
            Ok(response) => tracing::info!(
                username = %input.username,
                user_id = ?response.user_id,
                "User registered successfully"
            ),
            Err(e) => tracing::error!(
                username = %input.username,
                error = %e,
                "Register user failed"
            ),
        }
        observe("register", start, &result);
        result
    }

    /// `login` mutation.
    pub async fn login(
        &self,
        input: &LoginInput,
        client: Option<&ClientInfoInput>,
    ) -> GatewayResult<AuthResponse> {
        let start = Instant::now();
        tracing::info!(username = %input.username, "Login request");

        let client = ClientInfo::from_input(client);
        let result = self
            .backend
            .login(
                &auth::login_request(input),
                &client.ip_address,
                &client.user_agent,
            )
            .await
            .map(auth::auth_response)
            .map_err(GatewayError::from);

        match &result {
            Ok(response) => tracing::info!(
                username = %input.username,
                user_id = ?response.user_id,
                "User logged in successfully"
            ),
            Err(e) => tracing::error!(username = %input.username, error = %e, "Login failed"),
        }
        observe("login", start, &result);
        result
    }

    /// `logout` mutation. Needs the session id only.
    pub async fn logout(&self, ctx: &AuthContext) -> GatewayResult<GenericResponse> {
        let start = Instant::now();
        let result = self.logout_inner(ctx).await;

        match &result {
            Ok(_) => tracing::info!("User logged out successfully"),
            Err(e) => tracing::error!(error = %e, "Logout failed"),
        }
        observe("logout", start, &result);
        result
    }

    async fn logout_inner(&self, ctx: &AuthContext) -> GatewayResult<GenericResponse> {
        let session_id = ctx.require_session()?;
        tracing::info!(session = ?ctx.redacted_session(), "Logout request");

        let payload = self.backend.logout(session_id).await?;
        Ok(auth::generic_response(payload))
    }

    /// `sendMessage` mutation.
    pub async fn send_message(
        &self,
        ctx: &AuthContext,
        input: &SendMessageInput,
    ) -> GatewayResult<MessageResponse> {
        let start = Instant::now();
        let result = self.send_message_inner(ctx, input).await;

        match &result {
            Ok(response) => tracing::info!(
                receiver_username = %input.receiver_username,
                sender_id = ?ctx.user_id(),
                thread_id = ?response.data.as_ref().map(|m| m.thread_id.as_str()),
                "Message sent successfully"
            ),
            Err(e) => tracing::error!(
                receiver_username = %input.receiver_username,
                sender_id = ?ctx.user_id(),
                error = %e,
                "Send message failed"
            ),
        }
        observe("sendMessage", start, &result);
        result
    }

    async fn send_message_inner(
        &self,
        ctx: &AuthContext,
        input: &SendMessageInput,
    ) -> GatewayResult<MessageResponse> {
        let (session_id, user_id) = ctx.require_user()?;
        tracing::info!(
            receiver_username = %input.receiver_username,
            sender_id = %user_id,
            content_length = input.content.len(),
            "Send message request"
        );

        let payload = self
            .backend
            .send_message(&message::send_message_request(input), session_id, user_id)
            .await?;
        Ok(message::message_response(payload))
    }

    /// `getMessageHistory` query.
    pub async fn get_message_history(
        &self,
        ctx: &AuthContext,
        username: &str,
        pagination: Option<&PaginationInput>,
    ) -> GatewayResult<MessageHistoryResponse> {
        let start = Instant::now();
        let result = self.get_message_history_inner(ctx, username, pagination).await;

        match &result {
            Ok(response) => tracing::info!(
                username,
                user_id = ?ctx.user_id(),
                total = response.data.as_ref().map_or(0, |h| h.total),
                "Message history retrieved successfully"
            ),
            Err(e) => tracing::error!(
                username,
                user_id = ?ctx.user_id(),
                error = %e,
                "Get message history failed"
            ),
        }
        observe("getMessageHistory", start, &result);
        result
    }

    async fn get_message_history_inner(
        &self,
        ctx: &AuthContext,
        username: &str,
        pagination: Option<&PaginationInput>,
    ) -> GatewayResult<MessageHistoryResponse> {
        let (session_id, user_id) = ctx.require_user()?;
        let pagination = Pagination::from_input(pagination);
        tracing::info!(
            username,
            user_id,
            page = pagination.page(),
            size = pagination.size(),
            "Get message history request"
        );

        let payload = self
            .backend
            .get_message_history(
                username,
                session_id,
                user_id,
                pagination.limit(),
                pagination.offset(),
            )
            .await?;
        Ok(message::message_history_response(payload))
    }

    /// `getMyActivityLogs` query.
    pub async fn get_my_activity_logs(
        &self,
        ctx: &AuthContext,
        pagination: Option<&PaginationInput>,
    ) -> GatewayResult<ActivityResponse> {
        let start = Instant::now();
        let result = self.get_my_activity_logs_inner(ctx, pagination).await;

        match &result {
            Ok(response) => tracing::info!(
                user_id = ?ctx.user_id(),
                total_elements = response.data.as_ref().map_or(0, |p| p.total_elements),
                "Activity logs retrieved successfully"
            ),
            Err(e) => tracing::error!(
                user_id = ?ctx.user_id(),
                error = %e,
                "Get activity logs failed"
            ),
        }
        observe("getMyActivityLogs", start, &result);
        result
    }

    async fn get_my_activity_logs_inner(
        &self,
        ctx: &AuthContext,
        pagination: Option<&PaginationInput>,
    ) -> GatewayResult<ActivityResponse> {
        let (session_id, user_id) = ctx.require_user()?;
        let pagination = Pagination::from_input(pagination);
        tracing::info!(
            user_id,
            page = pagination.page(),
            size = pagination.size(),
            "Get activity logs request"
        );

        let payload = self
            .backend
            .get_activity_logs(
                session_id,
                user_id,
                i64::from(pagination.page()),
                i64::from(pagination.size()),
            )
            .await?;
        Ok(activity::activity_response(user_id, payload, pagination))
    }

    /// `health` query. Never fails.
    pub async fn health(&self) -> HealthStatus {
        self.probe(Probe::Health).await
    }

    /// `readiness` query. Never fails.
    pub async fn readiness(&self) -> HealthStatus {
        self.probe(Probe::Readiness).await
    }

    async fn probe(&self, probe: Probe) -> HealthStatus {
        let start = Instant::now();
        tracing::debug!(?probe, "Backend probe request");

        let result = match probe {
            Probe::Health => self.backend.get_health().await,
            Probe::Readiness => self.backend.get_readiness().await,
        };

        let operation = match probe {
            Probe::Health => "health",
            Probe::Readiness => "readiness",
        };

        match result {
            Ok(document) => {
                record_graphql_request(operation, "ok", start.elapsed());
                health::health_status(probe, &document, DateTime::now())
            }
            Err(e) => {
                tracing::error!(?probe, error = %e, "Backend probe failed");
                record_graphql_request(operation, "degraded", start.elapsed());
                health::health_failure(probe, &e.human_message, DateTime::now())
            }
        }
    }
}

fn observe<T>(operation: &str, start: Instant, result: &GatewayResult<T>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    record_graphql_request(operation, outcome, start.elapsed());
}
