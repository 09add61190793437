//! Request ID middleware for request tracing and correlation.
//!
//! Every request carries an `x-request-id`: the upstream value when it looks
//! sane, otherwise a fresh UUID v4. The ID is recorded on the request span,
//! tagged on the Sentry scope, and echoed on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted verbatim.
const MAX_UPSTREAM_ID_LENGTH: usize = 64;

/// Accept an upstream ID only if it is short and made of token characters.
fn sanitize_upstream(id: &str) -> Option<&str> {
    let valid = !id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then_some(id)
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(sanitize_upstream)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_upstream() {
        assert_eq!(sanitize_upstream("abc-123"), Some("abc-123"));
        assert_eq!(sanitize_upstream(""), None);
        assert_eq!(sanitize_upstream("has space"), None);
        assert_eq!(sanitize_upstream(&"a".repeat(65)), None);
    }
}
