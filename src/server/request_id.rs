use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderName, request::Parts},
    middleware::Next,
    response::Response,
};
use std::{convert::Infallible, fmt, sync::Arc};
use tracing::{Instrument, info_span};

const MAX_REQUEST_ID_LEN: usize = 128;
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation identifier of one inbound request.
///
/// Assigned by [`assign_request_id`] and handed to handlers as an extractor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Takes the caller's `x-request-id` when it is usable, otherwise mints a UUID v4.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
            .map_or_else(Self::generate, |v| Self(Arc::from(v)))
    }

    pub fn generate() -> Self {
        Self(Arc::from(uuid::Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(|| RequestId::from_headers(&parts.headers)))
    }
}

/// Outermost middleware: resolves the request id, stores it in the request extensions and
/// runs the rest of the stack inside a span carrying it. The id is not echoed back.
pub async fn assign_request_id(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    let span = info_span!("request", request_id = %request_id);
    req.extensions_mut().insert(request_id);
    next.run(req).instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn inbound_header_is_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(RequestId::from_headers(&headers).as_str(), "abc-123");
    }

    #[test]
    fn missing_or_oversized_header_generates_uuid() {
        let generated = RequestId::from_headers(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(generated.as_str()).is_ok());

        let mut headers = HeaderMap::new();
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        headers.insert(X_REQUEST_ID, HeaderValue::from_str(&long).unwrap());
        let replaced = RequestId::from_headers(&headers);
        assert_ne!(replaced.as_str(), long);
        assert!(uuid::Uuid::parse_str(replaced.as_str()).is_ok());
    }

    async fn echo(first: RequestId, second: RequestId) -> String {
        assert_eq!(first, second);
        first.to_string()
    }

    fn echo_router() -> axum::Router {
        axum::Router::new()
            .route("/echo", axum::routing::get(echo))
            .layer(axum::middleware::from_fn(assign_request_id))
    }

    async fn echoed(req: axum::http::Request<axum::body::Body>) -> String {
        use tower::ServiceExt;

        let resp = echo_router().oneshot(req).await.expect("request failed");
        assert!(resp.headers().get(X_REQUEST_ID).is_none());
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
    }

    #[tokio::test]
    async fn handlers_see_the_inbound_header() {
        let req = axum::http::Request::builder()
            .uri("/echo")
            .header(X_REQUEST_ID, "  trace-42  ")
            .body(axum::body::Body::empty())
            .expect("failed to build request");

        assert_eq!(echoed(req).await, "trace-42");
    }

    #[tokio::test]
    async fn handlers_share_the_generated_id() {
        let req = axum::http::Request::builder()
            .uri("/echo")
            .body(axum::body::Body::empty())
            .expect("failed to build request");

        let id = echoed(req).await;
        assert!(uuid::Uuid::parse_str(&id).is_ok(), "got {id}");
    }

    #[test]
    fn blank_header_generates_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("   "));
        let id = RequestId::from_headers(&headers);
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }
}
