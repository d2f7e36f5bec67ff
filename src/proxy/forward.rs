//! The forwarding proxy handler.
//!
//! # Data Flow
//! ```text
//! client request (/proxy/?url=...)
//!     → extract the url parameter (400 when missing)
//!     → allow-list check on the target host (403 when rejected)
//!     → selective header relay (session cookie, content type)
//!     → upstream exchange, redirects never followed
//!     → redirect answers surfaced to the caller with an explanatory body
//!     → everything else streamed back with the upstream status
//! ```
//!
//! # Design Decisions
//! - Only the Cookie and Content-Type headers are relayed upstream, and
//!   each only under its own conditions; everything else is dropped
//! - The whole request body is buffered before forwarding, capped by
//!   `proxy.max_body_bytes`
//! - URL fragments are not relayed; they never leave the client per RFC 3986

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::http::request::cookie_value;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Statuses the proxy refuses to relay as redirects.
const REDIRECT_STATUSES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
];

/// Relay one request to the host named in the `url` query parameter.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();

    let Some(raw_url) = url_param(request.uri().query()) else {
        metrics::record_proxy_request(&method_str, 400, "missing_url", start_time);
        return (
            StatusCode::BAD_REQUEST,
            "The proxy service requires a URL-encoded URL as a parameter.",
        )
            .into_response();
    };

    let target = match Url::parse(&raw_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            metrics::record_proxy_request(&method_str, 400, "bad_target", start_time);
            return (
                StatusCode::BAD_REQUEST,
                "The url parameter is not a valid absolute http URL.",
            )
                .into_response();
        }
    };

    let host = target.host_str().unwrap_or("");
    if !state.config.proxy.permissive && !state.allowlist.allows(host) {
        warn!(host, "Proxy target rejected by allow-list");
        metrics::record_proxy_request(&method_str, 403, "forbidden_host", start_time);
        return (
            StatusCode::FORBIDDEN,
            "The host of the URL provided to the proxy service is not in the proxy allow-list.",
        )
            .into_response();
    }

    // Selective header relay. The session cookie travels only to the OGC
    // server itself; Content-Type only accompanies a request body.
    let mut upstream_headers = HeaderMap::new();
    let session_present =
        cookie_value(request.headers(), &state.config.session.cookie_name).is_some();
    if session_present && state.allowlist.is_same_site(&target) {
        if let Some(cookie) = request.headers().get(header::COOKIE) {
            upstream_headers.insert(header::COOKIE, cookie.clone());
        }
    }
    if method == Method::POST || method == Method::PUT {
        if let Some(content_type) = request.headers().get(header::CONTENT_TYPE) {
            upstream_headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
    }

    let body = match axum::body::to_bytes(request.into_body(), state.config.proxy.max_body_bytes)
        .await
    {
        Ok(bytes) => bytes,
        Err(_) => {
            metrics::record_proxy_request(&method_str, 413, "body_too_large", start_time);
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body exceeds the configured proxy limit.",
            )
                .into_response();
        }
    };

    debug!(method = %method_str, target = %target, "Forwarding proxy request");

    let upstream = state
        .upstream
        .request(method, target.clone())
        .headers(upstream_headers)
        .body(body)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, target = %target, "Upstream request failed");
            metrics::record_proxy_request(&method_str, 502, "upstream_error", start_time);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("text/plain"));

    if REDIRECT_STATUSES.contains(&status) {
        let location = response.headers().get(header::LOCATION).cloned();
        let location_text = location
            .as_ref()
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        info!(status = %status, location = %location_text, "Refusing upstream redirect");
        metrics::record_proxy_request(&method_str, status.as_u16(), "redirect_refused", start_time);

        let message = format!(
            "This proxy does not support redirects. The server in \"{}\" asked for a redirect to \"{}\"",
            target, location_text
        );
        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(location) = location {
            builder = builder.header(header::LOCATION, location);
        }
        return builder.body(Body::from(message)).unwrap();
    }

    metrics::record_proxy_request(&method_str, status.as_u16(), "relayed", start_time);
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(response.bytes_stream()))
        .unwrap()
}

/// The decoded `url` query parameter, when present.
fn url_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}
