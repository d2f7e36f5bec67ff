//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID and stamp it on request and response
//! - Expose the ID to handlers through request extensions
//! - Parse request cookies for the session and proxy handlers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An ID supplied by the caller is kept, so portal-issued IDs survive
//! - Cookie parsing is lenient; malformed pairs are skipped

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::response::Response;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request extension holding the ID assigned to the request.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Stamps every request and response with an `x-request-id` header.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), S::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        request.extensions_mut().insert(RequestId(id.clone()));

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            if let Ok(value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Ok(response)
        })
    }
}

/// Value of one cookie from the request's Cookie header, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
