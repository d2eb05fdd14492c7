//! Request/response logging middleware with credential redaction

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use super::metrics::matched_path;

/// Headers that carry credentials or session tokens
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "access-token",
    "proxy-authorization",
    "cookie",
    "set-cookie",
];

/// Headers worth logging at all
const LOGGED_HEADERS: &[&str] = &[
    "content-type",
    "content-length",
    "accept",
    "user-agent",
    "x-request-id",
    "x-forwarded-for",
    "authorization",
    "access-token",
];

/// Log each request and its completion.
///
/// Does not open its own span; `TraceLayer` already does.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let request_id = request_id(request.headers());

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %redact_headers(request.headers()),
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        headers = %redact_headers(response.headers()),
        "Request completed"
    );

    response
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Render the loggable headers, masking credential values
fn redact_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| LOGGED_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| {
            let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name, value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic YWxpY2U6cHcxMjM=".parse().unwrap());
        headers.insert("access-token", "eyJhbGciOiJIUzI1NiJ9.x.y".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let rendered = redact_headers(&headers);

        assert!(!rendered.contains("YWxpY2U6cHcxMjM="));
        assert!(!rendered.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(rendered.contains("authorization=[REDACTED]"));
        assert!(rendered.contains("access-token=[REDACTED]"));
        assert!(rendered.contains("content-type=application/json"));
    }

    #[test]
    fn test_unlisted_headers_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("etag", "\"abc\"".parse().unwrap());

        assert_eq!(redact_headers(&headers), "");
    }

    #[test]
    fn test_request_id_is_propagated_or_generated() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers).len(), 36);

        headers.insert("x-request-id", "req-1".parse().unwrap());
        assert_eq!(request_id(&headers), "req-1");
    }
}
