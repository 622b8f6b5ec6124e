//! GraphQL schema: query and mutation roots over [`OperationHandlers`].
//!
//! Resolvers pull the handlers from schema data and the per-request
//! [`AuthContext`] from request data, then convert handler errors into
//! GraphQL errors carrying the taxonomy code in `extensions`.

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema};

use crate::context::AuthContext;
use crate::handlers::OperationHandlers;
use crate::model::{
    ActivityResponse, AuthResponse, ClientInfoInput, GenericResponse, HealthStatus, LoginInput,
    MessageHistoryResponse, MessageResponse, PaginationInput, RegisterInput, SendMessageInput,
};

/// The gateway schema.
pub type GatewaySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema over the given handlers.
pub fn build_schema(handlers: OperationHandlers, introspection: bool) -> GatewaySchema {
    let builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(handlers);
    if introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}

fn handlers<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a OperationHandlers> {
    ctx.data::<OperationHandlers>()
}

/// Auth context of the current request; anonymous when none was attached.
fn auth(ctx: &Context<'_>) -> AuthContext {
    ctx.data_opt::<AuthContext>().cloned().unwrap_or_default()
}

/// Query root.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Conversation between the caller and `username`.
    async fn get_message_history(
        &self,
        ctx: &Context<'_>,
        username: String,
        pagination: Option<PaginationInput>,
    ) -> async_graphql::Result<MessageHistoryResponse> {
        handlers(ctx)?
            .get_message_history(&auth(ctx), &username, pagination.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    /// The caller's own activity log.
    async fn get_my_activity_logs(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> async_graphql::Result<ActivityResponse> {
        handlers(ctx)?
            .get_my_activity_logs(&auth(ctx), pagination.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    /// Backend health.
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthStatus> {
        Ok(handlers(ctx)?.health().await)
    }

    /// Backend readiness.
    async fn readiness(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthStatus> {
        Ok(handlers(ctx)?.readiness().await)
    }
}

/// Mutation root.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create an account.
    async fn register(
        &self,
        ctx: &Context<'_>,
        input: RegisterInput,
        client_info: Option<ClientInfoInput>,
    ) -> async_graphql::Result<AuthResponse> {
        handlers(ctx)?
            .register(&input, client_info.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    /// Start a session.
    async fn login(
        &self,
        ctx: &Context<'_>,
        input: LoginInput,
        client_info: Option<ClientInfoInput>,
    ) -> async_graphql::Result<AuthResponse> {
        handlers(ctx)?
            .login(&input, client_info.as_ref())
            .await
            .map_err(|e| e.extend())
    }

    /// End the caller's session.
    async fn logout(&self, ctx: &Context<'_>) -> async_graphql::Result<GenericResponse> {
        handlers(ctx)?
            .logout(&auth(ctx))
            .await
            .map_err(|e| e.extend())
    }

    /// Send a message to another user.
    async fn send_message(
        &self,
        ctx: &Context<'_>,
        input: SendMessageInput,
    ) -> async_graphql::Result<MessageResponse> {
        handlers(ctx)?
            .send_message(&auth(ctx), &input)
            .await
            .map_err(|e| e.extend())
    }
}
