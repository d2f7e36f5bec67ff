//! Remote service endpoint registration.
//!
//! Users point the portal at external map services (tile caches, warpers,
//! OWS servers) by submitting the service URL here. Submissions are
//! validated, stamped with the signed-in user as owner, and stored in the
//! catalog for the service browser to list.

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::http::server::AppState;

/// JSON body of an endpoint submission.
#[derive(Debug, Deserialize)]
pub struct EndpointSubmission {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,
}

/// Why a submission was rejected.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("url must not be empty")]
    EmptyUrl,

    #[error("url is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("url scheme must be http or https, got '{0}'")]
    UnsupportedScheme(String),
}

/// `POST /endpoints`
pub async fn add_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<EndpointSubmission>,
) -> Response {
    if let Err(error) = validate_submission(&submission) {
        warn!(url = %submission.url, %error, "Rejected endpoint submission");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": [error.to_string()] })),
        )
            .into_response();
    }

    let ctx = state
        .sessions
        .context(&headers, &state.config.session.cookie_name);
    let record = state
        .catalog
        .add_endpoint(submission.url, submission.description, ctx.user);

    info!(id = record.id, url = %record.url, "Endpoint registered");
    (StatusCode::CREATED, Json(record)).into_response()
}

fn validate_submission(submission: &EndpointSubmission) -> Result<(), EndpointError> {
    if submission.url.is_empty() {
        return Err(EndpointError::EmptyUrl);
    }
    let parsed = Url::parse(&submission.url)
        .map_err(|_| EndpointError::InvalidUrl(submission.url.clone()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(EndpointError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(())
}
