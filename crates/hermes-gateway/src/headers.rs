//! Header names and helpers shared by the context extractor and the backend
//! client.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

/// Session id header, inbound from clients and outbound to the backend.
pub static HEADER_SESSION_ID: HeaderName = HeaderName::from_static("x-session-id");

/// User id header, inbound from clients and outbound to the backend.
pub static HEADER_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Session token header. The backend emits it next to the user id on
/// register/login.
pub static HEADER_SESSION_TOKEN: HeaderName = HeaderName::from_static("x-session-token");

/// Client IP forwarded to the backend on register/login.
pub static HEADER_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Request ID for correlation.
pub static HEADER_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Fixed client identifier sent on every backend call.
pub const CLIENT_USER_AGENT: &str = concat!("Hermes-Gateway/", env!("CARGO_PKG_VERSION"));

/// Headers removed before request/response headers are logged.
pub static SENSITIVE_HEADERS: &[&str] = &["x-session-id", "authorization"];

/// Check if a header must be redacted from logs.
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
}

/// Copy of `headers` without the sensitive entries.
///
/// Every other header, including repeated values, is retained unchanged.
pub fn sanitize_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        if !is_sensitive_header(name.as_str()) {
            sanitized.append(name.clone(), value.clone());
        }
    }

    sanitized
}

/// Read a header as a trimmed, non-empty string.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Insert a header, skipping values that are not valid header text.
///
/// Returns whether the value was inserted.
pub fn insert_header(headers: &mut HeaderMap, name: &HeaderName, value: &str) -> bool {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name.clone(), value);
            true
        }
        Err(_) => {
            tracing::warn!(header = %name, "Dropping header with invalid value");
            false
        }
    }
}

/// Generate a new request ID.
pub fn new_request_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("x-session-id"));
        assert!(is_sensitive_header("X-Session-Id"));
        assert!(is_sensitive_header("Authorization"));
        assert!(!is_sensitive_header("x-user-id"));
        assert!(!is_sensitive_header("content-type"));
    }

    #[test]
    fn test_sanitize_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-session-id", HeaderValue::from_static("secret-session"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        headers.insert(USER_AGENT, HeaderValue::from_static("test-agent"));

        let sanitized = sanitize_headers(&headers);

        assert_eq!(sanitized.len(), 2);
        assert_eq!(sanitized.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(sanitized.get(USER_AGENT).unwrap(), "test-agent");
        assert!(!sanitized.contains_key(&HEADER_SESSION_ID));
        assert!(!sanitized.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_sanitize_keeps_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized.get_all("accept").iter().count(), 2);
    }

    #[test]
    fn test_header_str() {
        let mut headers = HeaderMap::new();
        headers.insert(&HEADER_USER_ID, HeaderValue::from_static(" user-1 "));
        headers.insert(&HEADER_SESSION_ID, HeaderValue::from_static(""));

        assert_eq!(header_str(&headers, &HEADER_USER_ID), Some("user-1"));
        assert_eq!(header_str(&headers, &HEADER_SESSION_ID), None);
        assert_eq!(header_str(&headers, &HEADER_REQUEST_ID), None);
    }

    #[test]
    fn test_insert_header_rejects_invalid_values() {
        let mut headers = HeaderMap::new();
        assert!(insert_header(&mut headers, &HEADER_FORWARDED_FOR, "10.0.0.1"));
        assert!(!insert_header(&mut headers, &HEADER_USER_ID, "bad\nvalue"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_client_user_agent() {
        assert!(CLIENT_USER_AGENT.starts_with("Hermes-Gateway/"));
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(new_request_id(), new_request_id());
    }
}
