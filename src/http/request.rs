//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Expose the ID to handlers and middleware via a request extension
//!
//! # Design Decisions
//! - Request ID is added as early as possible so every log line and
//!   metric for the request can carry it
//! - A client-supplied `x-request-id` is trusted and propagated as-is

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Extension holding the request's ID.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Layer inserting [`RequestId`] and the `x-request-id` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if !request.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        request.extensions_mut().insert(RequestId(id));

        self.inner.call(request)
    }
}

/// Convenience accessor for the request ID extension.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions().get::<RequestId>().map(|id| id.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::{service_fn, ServiceExt};

    async fn echo_id(request: Request<Body>) -> Result<Option<String>, std::convert::Infallible> {
        Ok(request.request_id().map(str::to_owned))
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let request = Request::builder().body(Body::empty()).unwrap();

        let id = service.oneshot(request).await.unwrap().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_preserves_client_id() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let request = Request::builder()
            .header(X_REQUEST_ID, "client-supplied")
            .body(Body::empty())
            .unwrap();

        let id = service.oneshot(request).await.unwrap().unwrap();
        assert_eq!(id, "client-supplied");
    }
}
