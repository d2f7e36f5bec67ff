//! Layer visit counter endpoint.
//!
//! The map viewer fires a form POST at `/ajax-layer-stats/` every time it
//! opens a layer. The handler bumps the layer's visit counter and, once per
//! session per layer, its unique-visitor counter. Unknown or blank layer
//! names are acknowledged without counting anything so a stale viewer page
//! cannot surface errors to the browser.

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use crate::catalog::store::Catalog;
use crate::catalog::types::LayerStats;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::SessionStore;

/// Form body posted by the viewer.
#[derive(Debug, Deserialize)]
pub struct LayerStatsForm {
    /// Qualified typename of the visited layer. Missing field counts as
    /// blank.
    #[serde(default)]
    pub layername: String,
}

/// `POST /ajax-layer-stats/`
pub async fn increment_layer_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LayerStatsForm>,
) -> Response {
    let ctx = state
        .sessions
        .context(&headers, &state.config.session.cookie_name);

    match count_visit(
        &state.catalog,
        &state.sessions,
        ctx.session_id.as_deref(),
        &form.layername,
    ) {
        Some((stats, unique)) => {
            metrics::record_layer_visit(unique);
            debug!(
                layername = %form.layername,
                visits = stats.visits,
                uniques = stats.uniques,
                "Layer visit recorded"
            );
        }
        None => {
            debug!(layername = %form.layername, "Layer visit ignored");
        }
    }

    StatusCode::OK.into_response()
}

/// Count one visit against the named layer. Returns the updated counters and
/// whether the visit was unique, or `None` when the name is blank or matches
/// no layer. A request without a session counts as a fresh session, so every
/// such visit is unique.
fn count_visit(
    catalog: &Catalog,
    sessions: &SessionStore,
    session_id: Option<&str>,
    layername: &str,
) -> Option<(LayerStats, bool)> {
    if layername.is_empty() {
        return None;
    }
    let layer = catalog.layer_by_typename(layername)?;

    let first_in_session = match session_id {
        Some(session_id) => sessions.first_visit(session_id, layer.id),
        None => true,
    };
    let stats = catalog.record_visit(layer.id, first_in_session);

    Some((stats, first_in_session))
}
