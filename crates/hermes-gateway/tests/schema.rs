//! GraphQL schema tests: queries executed through `async_graphql`.

mod common;

use std::sync::Arc;

use async_graphql::Request;
use common::{Call, FakeBackend};
use serde_json::{json, Value};

use hermes_gateway::{build_schema, AuthContext, GatewaySchema, OperationHandlers, StructuredError};

fn schema(backend: &Arc<FakeBackend>) -> GatewaySchema {
    let handlers = OperationHandlers::new(Arc::clone(backend) as Arc<dyn hermes_gateway::Backend>);
    build_schema(handlers, false)
}

fn signed_in() -> AuthContext {
    AuthContext::new(Some("sess-1".to_string()), Some("user-1".to_string()))
}

async fn run(schema: &GatewaySchema, query: &str, auth: Option<AuthContext>) -> Value {
    let mut request = Request::new(query);
    if let Some(auth) = auth {
        request = request.data(auth);
    }
    serde_json::to_value(schema.execute(request).await).unwrap()
}

#[tokio::test]
async fn test_activity_logs_query() {
    let backend = FakeBackend::new();
    let body = run(
        &schema(&backend),
        r"{
            getMyActivityLogs(pagination: {page: 0, size: 20}) {
                success
                data {
                    totalElements totalPages currentPage pageSize
                    activities { id activityType description timestamp metadata }
                }
            }
        }",
        Some(signed_in()),
    )
    .await;

    assert!(body.get("errors").is_none(), "{body}");
    let page = &body["data"]["getMyActivityLogs"]["data"];
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["pageSize"], 20);

    let activity = &page["activities"][0];
    assert_eq!(activity["id"], "user-1-123");
    assert_eq!(activity["activityType"], "LOGIN");
    assert_eq!(activity["description"], "LOGIN - Success");
    assert_eq!(activity["timestamp"], "1970-01-01T00:00:00.123Z");
    assert_eq!(
        serde_json::from_str::<Value>(activity["metadata"].as_str().unwrap()).unwrap(),
        json!({"successful": true, "failureReason": null})
    );
}

#[tokio::test]
async fn test_pagination_defaults_apply() {
    let backend = FakeBackend::new();
    let body = run(
        &schema(&backend),
        r#"{ getMessageHistory(username: "bob", pagination: {page: 2}) { data { limit offset } } }"#,
        Some(signed_in()),
    )
    .await;

    assert_eq!(body["data"]["getMessageHistory"]["data"]["limit"], 20);
    assert_eq!(body["data"]["getMessageHistory"]["data"]["offset"], 40);
}

#[tokio::test]
async fn test_missing_headers_give_authentication_required() {
    let backend = FakeBackend::new();
    let body = run(
        &schema(&backend),
        r#"mutation { sendMessage(input: {receiverUsername: "bob", content: "hi"}) { success } }"#,
        None,
    )
    .await;

    let error = &body["errors"][0];
    assert_eq!(error["message"], "Authentication required");
    assert_eq!(error["path"], json!(["sendMessage"]));
    assert_eq!(error["extensions"]["code"], "AUTHENTICATION_REQUIRED");
    assert_eq!(error["extensions"]["statusCode"], 401);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_backend_error_extensions() {
    let details = json!({"success": false, "message": "Username already exists"});
    let backend = FakeBackend::failing(StructuredError::new(
        "register",
        Some(409),
        details.clone(),
        None,
    ));

    let body = run(
        &schema(&backend),
        r#"mutation {
            register(input: {username: "alice", email: "a@example.com", password: "pw"},
                     clientInfo: {ipAddress: "10.0.0.1"}) { success }
        }"#,
        None,
    )
    .await;

    let error = &body["errors"][0];
    assert_eq!(error["message"], "Username already exists");
    assert_eq!(error["extensions"]["code"], "CONFLICT");
    assert_eq!(error["extensions"]["statusCode"], 409);
    assert_eq!(error["extensions"]["operation"], "register");
    assert_eq!(error["extensions"]["details"], details);

    assert_eq!(
        backend.calls(),
        vec![Call::Register {
            username: "alice".to_string(),
            ip_address: "10.0.0.1".to_string(),
            user_agent: "GraphQL-Client/1.0.0".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_health_query_degrades() {
    let backend = FakeBackend::failing(StructuredError::transport("getHealth", "timeout"));
    let body = run(&schema(&backend), "{ health { status details timestamp } }", None).await;

    assert!(body.get("errors").is_none(), "{body}");
    assert_eq!(body["data"]["health"]["status"], "DOWN");
    assert_eq!(
        body["data"]["health"]["details"],
        "Health check failed: timeout"
    );
    assert!(body["data"]["health"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_login_returns_session_fields() {
    let backend = FakeBackend::new();
    let body = run(
        &schema(&backend),
        r#"mutation { login(input: {username: "alice", password: "pw"}) {
            success sessionId userId data { id username }
        } }"#,
        None,
    )
    .await;

    let login = &body["data"]["login"];
    assert_eq!(login["success"], true);
    assert_eq!(login["sessionId"], "session-abcdef123456");
    assert_eq!(login["userId"], "user-1");
    assert_eq!(login["data"]["username"], "alice");
}

#[tokio::test]
async fn test_introspection_disabled() {
    let backend = FakeBackend::new();
    let body = run(&schema(&backend), "{ __schema { queryType { name } } }", None).await;

    assert!(body.get("errors").is_some() || body["data"]["__schema"].is_null());
}
