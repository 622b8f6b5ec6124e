//! Backend client tests against a mock REST API.
//!
//! Each test starts its own server on an ephemeral port, so the tests are
//! independent and can run in parallel.

mod common;

use common::{Canned, MockRestApi};
use serde_json::{json, Value};

use hermes_gateway::backend::{
    Backend, LoginRequest, RegisterRequest, SendMessageRequest,
};
use hermes_gateway::headers::CLIENT_USER_AGENT;
use hermes_gateway::ErrorCode;

fn register_request() -> RegisterRequest {
    RegisterRequest {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "s3cret".to_string(),
    }
}

#[tokio::test]
async fn test_register_forwards_client_info() {
    let api = MockRestApi::start(vec![(
        "/api/auth/register",
        Canned::json(
            201,
            json!({"success": true, "message": "User registered", "data": {"id": "u-1"}}),
        ),
    )])
    .await;

    let payload = api
        .client()
        .register(&register_request(), "10.0.0.7", "Mozilla/5.0")
        .await
        .unwrap();

    assert!(payload.payload.success);
    assert_eq!(payload.payload.message, "User registered");
    assert_eq!(payload.session_id, None);

    let request = api.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/auth/register");
    assert_eq!(request.header("x-forwarded-for"), Some("10.0.0.7"));
    assert_eq!(request.header("user-agent"), Some("Mozilla/5.0"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        request.body,
        json!({"username": "alice", "email": "alice@example.com", "password": "s3cret"})
    );
}

#[tokio::test]
async fn test_login_reads_session_headers() {
    let api = MockRestApi::start(vec![(
        "/api/auth/login",
        Canned::json(200, json!({"success": true, "message": "Login successful"}))
            .with_header("x-session-id", "sess-123")
            .with_header("x-user-id", "user-9"),
    )])
    .await;

    let credentials = LoginRequest {
        username: "alice".to_string(),
        password: "s3cret".to_string(),
    };
    let payload = api
        .client()
        .login(&credentials, "127.0.0.1", "GraphQL-Client/1.0.0")
        .await
        .unwrap();

    assert_eq!(payload.session_id.as_deref(), Some("sess-123"));
    assert_eq!(payload.user_id.as_deref(), Some("user-9"));
    assert_eq!(api.single_request().body, json!({"username": "alice", "password": "s3cret"}));
}

#[tokio::test]
async fn test_login_falls_back_to_session_token_header() {
    let api = MockRestApi::start(vec![(
        "/api/auth/login",
        Canned::json(200, json!({"success": true, "message": "ok"}))
            .with_header("x-session-token", "tok-1"),
    )])
    .await;

    let credentials = LoginRequest {
        username: "alice".to_string(),
        password: "pw".to_string(),
    };
    let payload = api.client().login(&credentials, "ip", "ua").await.unwrap();

    assert_eq!(payload.session_id.as_deref(), Some("tok-1"));
    assert_eq!(payload.user_id, None);
}

#[tokio::test]
async fn test_logout_sends_session_only() {
    let api = MockRestApi::start(vec![(
        "/api/auth/logout",
        Canned::json(200, json!({"success": true, "message": "Logged out"})),
    )])
    .await;

    let payload = api.client().logout("sess-1").await.unwrap();
    assert_eq!(payload.message, "Logged out");

    let request = api.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.header("x-session-id"), Some("sess-1"));
    assert_eq!(request.header("x-user-id"), None);
    assert_eq!(request.header("user-agent"), Some(CLIENT_USER_AGENT));
    assert_eq!(request.body, json!({}));
}

#[tokio::test]
async fn test_send_message_path_and_headers() {
    let api = MockRestApi::start(vec![(
        "/api/messages/send",
        Canned::json(
            200,
            json!({
                "success": true,
                "message": "Message sent",
                "data": {"id": "m-1", "threadId": "t-1", "sender": "user-1", "content": "hello"}
            }),
        ),
    )])
    .await;

    let message = SendMessageRequest {
        recipient: "bob".to_string(),
        content: "hello".to_string(),
    };
    let payload = api
        .client()
        .send_message(&message, "sess-1", "user-1")
        .await
        .unwrap();

    let sent = payload.data.unwrap();
    assert_eq!(sent.thread_id.as_deref(), Some("t-1"));
    assert_eq!(sent.content.as_deref(), Some("hello"));

    let request = api.single_request();
    assert_eq!(request.header("x-session-id"), Some("sess-1"));
    assert_eq!(request.header("x-user-id"), Some("user-1"));
    assert_eq!(request.body, json!({"recipient": "bob", "content": "hello"}));
}

#[tokio::test]
async fn test_message_history_query_string() {
    let api = MockRestApi::start(vec![(
        "/api/messages/history",
        Canned::json(
            200,
            json!({"success": true, "message": "ok", "data": {"data": [], "total": 0, "limit": 10, "offset": 10}}),
        ),
    )])
    .await;

    let payload = api
        .client()
        .get_message_history("bob", "sess-1", "user-1", 10, 10)
        .await
        .unwrap();
    assert_eq!(payload.data.unwrap().offset, 10);

    let request = api.single_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.query.as_deref(), Some("username=bob&limit=10&offset=10"));
    assert_eq!(request.header("x-user-id"), Some("user-1"));
}

#[tokio::test]
async fn test_activity_logs_query_string() {
    let api = MockRestApi::start(vec![(
        "/api/activities/logs",
        Canned::json(200, json!({"success": true, "message": "ok", "data": {"data": [], "total": 0}})),
    )])
    .await;

    api.client()
        .get_activity_logs("sess-1", "user-1", 2, 5)
        .await
        .unwrap();

    let request = api.single_request();
    assert_eq!(request.path, "/api/activities/logs");
    assert_eq!(request.query.as_deref(), Some("page=2&size=5"));
}

#[tokio::test]
async fn test_health_documents_are_raw_json() {
    let api = MockRestApi::start(vec![
        ("/api/health", Canned::json(200, json!({"status": "UP"}))),
        ("/api/ready", Canned::json(200, json!({"checks": ["db"]}))),
    ])
    .await;

    let client = api.client();
    assert_eq!(client.get_health().await.unwrap(), json!({"status": "UP"}));
    assert_eq!(client.get_readiness().await.unwrap(), json!({"checks": ["db"]}));
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn test_conflict_keeps_backend_message() {
    let body = json!({"success": false, "message": "Username already exists"});
    let api = MockRestApi::start(vec![(
        "/api/auth/register",
        Canned::json(409, body.clone()),
    )])
    .await;

    let err = api
        .client()
        .register(&register_request(), "ip", "ua")
        .await
        .unwrap_err();

    assert_eq!(err.human_message, "Username already exists");
    assert_eq!(err.error_code, ErrorCode::Conflict);
    assert_eq!(err.http_status, 409);
    assert_eq!(err.operation, "register");
    assert_eq!(err.raw_details, body);
}

#[tokio::test]
async fn test_status_codes_map_to_taxonomy() {
    let cases = [
        (400, ErrorCode::BadRequest),
        (401, ErrorCode::Unauthorized),
        (403, ErrorCode::Forbidden),
        (404, ErrorCode::NotFound),
        (422, ErrorCode::ValidationError),
        (500, ErrorCode::InternalServerError),
        (503, ErrorCode::UnknownError),
    ];

    for (status, code) in cases {
        let api = MockRestApi::start(vec![(
            "/api/auth/logout",
            Canned::json(status, json!({"message": format!("status {status}")})),
        )])
        .await;

        let err = api.client().logout("sess").await.unwrap_err();
        assert_eq!(err.error_code, code, "status {status}");
        assert_eq!(err.http_status, status);
        assert_eq!(err.human_message, format!("status {status}"));
    }
}

#[tokio::test]
async fn test_non_json_error_body_uses_status_message() {
    let api = MockRestApi::start(vec![(
        "/api/messages/send",
        Canned::text(502, "Bad Gateway"),
    )])
    .await;

    let message = SendMessageRequest {
        recipient: "bob".to_string(),
        content: "hi".to_string(),
    };
    let err = api
        .client()
        .send_message(&message, "sess", "user")
        .await
        .unwrap_err();

    assert_eq!(err.human_message, "Request failed with status code 502");
    assert_eq!(err.error_code, ErrorCode::UnknownError);
    assert_eq!(err.http_status, 502);
    assert_eq!(err.raw_details, json!({}));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let api = MockRestApi::start(vec![(
        "/api/activities/logs",
        Canned::json(200, json!({"unexpected": true})),
    )])
    .await;

    let err = api
        .client()
        .get_activity_logs("sess", "user", 0, 20)
        .await
        .unwrap_err();

    assert_eq!(err.error_code, ErrorCode::UnknownError);
    assert_eq!(err.http_status, 200);
    assert_eq!(err.operation, "getActivityLogs");
    assert_ne!(err.raw_details, Value::Null);
}
