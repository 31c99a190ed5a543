//! Security headers applied to every storefront response.

use axum::{
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy for storefront pages.
///
/// Scripts come from this origin plus the HTMX CDN. Product icons may be
/// hosted anywhere over HTTPS. The SSE cart stream is same-origin.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'self' https://unpkg.com; \
     style-src 'self'; \
     font-src 'self'; \
     img-src 'self' https: data:; \
     connect-src 'self'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

const PERMISSIONS_POLICY: &str = "camera=(), geolocation=(), microphone=(), payment=(), usb=()";

/// Add security headers to all responses.
///
/// Hashed assets under `/static/` keep a long-lived cache; everything else
/// is `no-store` since pages carry per-session cart and account data.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_static = request.uri().path().starts_with("/static/");
    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), is_static);
    response
}

/// Insert the security header set into `headers`.
pub fn apply_security_headers(headers: &mut HeaderMap, is_static: bool) {
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    let cache = if is_static {
        "public, max-age=31536000, immutable"
    } else {
        "no-store, max-age=0"
    };
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_headers() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, false);
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-store, max-age=0");
        assert!(
            headers
                .get(CONTENT_SECURITY_POLICY)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|csp| csp.contains("https://unpkg.com"))
        );
    }

    #[test]
    fn test_static_assets_are_cacheable() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, true);
        assert_eq!(
            headers.get(CACHE_CONTROL).unwrap(),
            "public, max-age=31536000, immutable"
        );
    }
}
