//! Request ID middleware for request tracing and correlation.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id that is trusted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that tags every request with an id.
///
/// An upstream `x-request-id` is reused when it looks sane; otherwise a
/// UUID v4 is generated. The id is recorded in the current span, set as a
/// Sentry tag and echoed in the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// An upstream request id, if present, short and printable.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_is_reused() {
        assert_eq!(
            incoming_request_id(&headers_with("cf-1234")),
            Some("cf-1234".to_string())
        );
    }

    #[test]
    fn test_bad_upstream_id_is_replaced() {
        assert_eq!(incoming_request_id(&headers_with("has space")), None);
        assert_eq!(incoming_request_id(&headers_with(&"x".repeat(200))), None);
        assert_eq!(incoming_request_id(&HeaderMap::new()), None);
    }
}
