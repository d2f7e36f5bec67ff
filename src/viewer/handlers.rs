//! Map viewer HTTP handlers.
//!
//! # Responsibilities
//! - Build the configuration for a fresh viewer (empty, from layers, or
//!   copied from a saved map)
//! - Serve the composer configuration of saved maps and hosted sites
//! - Enforce map visibility against the requesting session

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::{debug, info};

use crate::catalog::types::MapRecord;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::UserContext;
use crate::viewer::assemble::{assemble_from_layers, MapDraft};
use crate::viewer::worldmap::geoexplorer_to_worldmap;

const PERMISSION_MESSAGE: &str = "You are not allowed to view this map.";

/// Form bodies larger than this are rejected outright.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// GET or POST `/maps/new`.
///
/// Three cases: `copy` (GET only) clones a saved map's configuration,
/// `layer` parameters assemble a draft around those layers, and bare
/// requests serve the configured default map.
pub async fn new_map(State(state): State<AppState>, request: Request<Body>) -> Response {
    let ctx = state
        .sessions
        .context(request.headers(), &state.config.session.cookie_name);
    let method = request.method().clone();

    let params = if method == Method::GET {
        Params::from_query(request.uri().query())
    } else if method == Method::POST {
        match form_params(request).await {
            Ok(params) => params,
            Err(response) => return response,
        }
    } else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    if method == Method::GET {
        if let Some(copy) = params.first("copy") {
            return copied_map_config(&state, &ctx, copy);
        }
    }

    let layer_names = params.all("layer");
    let config = if layer_names.is_empty() {
        metrics::record_viewer_config("empty");
        let draft = MapDraft::empty(&state.config);
        let mut config = draft.viewer_json();
        geoexplorer_to_worldmap(
            &mut config,
            &state.catalog,
            &state.config.map.intro_text,
            &draft.layers,
        );
        config
    } else {
        metrics::record_viewer_config("from_layers");
        let draft = assemble_from_layers(&state.config, &state.catalog, &ctx, &layer_names);
        debug!(
            requested = layer_names.len(),
            included = draft.layers.len() - state.config.map.base_layers.len(),
            "Assembled viewer configuration from layers"
        );
        let mut config = draft.viewer_json();
        config["fromLayer"] = serde_json::json!(true);
        geoexplorer_to_worldmap(
            &mut config,
            &state.catalog,
            &state.config.map.intro_text,
            &draft.layers,
        );
        config
    };

    Json(config).into_response()
}

/// GET `/maps/{mapid}`.
pub async fn map_view(
    State(state): State<AppState>,
    Path(mapid): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(map) = mapid.parse::<i64>().ok().and_then(|id| state.catalog.map(id)) else {
        return (StatusCode::NOT_FOUND, "Map not found").into_response();
    };
    saved_map_response(&state, map, &headers)
}

/// GET `/sites/{site}`, the composer opened on the hosted site's map.
pub async fn site_view(
    State(state): State<AppState>,
    Path(site): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(map) = state.catalog.map_by_url_suffix(&site) else {
        return (StatusCode::NOT_FOUND, "Site not found").into_response();
    };
    saved_map_response(&state, map, &headers)
}

/// Shared tail of the saved-map routes: visibility check, serialization,
/// WorldMap conversion.
fn saved_map_response(state: &AppState, map: MapRecord, headers: &HeaderMap) -> Response {
    let ctx = state
        .sessions
        .context(headers, &state.config.session.cookie_name);
    if !map.visible_to(ctx.user.as_deref()) {
        return (StatusCode::FORBIDDEN, PERMISSION_MESSAGE).into_response();
    }

    metrics::record_viewer_config("saved");
    debug!(map_id = map.id, "Serving saved map configuration");

    let draft = MapDraft::from_record(&map);
    let mut config = draft.viewer_json();
    geoexplorer_to_worldmap(
        &mut config,
        &state.catalog,
        &state.config.map.intro_text,
        &map.layers,
    );
    Json(config).into_response()
}

/// The copy case: the saved map's configuration stripped of its identity.
fn copied_map_config(state: &AppState, ctx: &UserContext, mapid: &str) -> Response {
    let Some(map) = mapid.parse::<i64>().ok().and_then(|id| state.catalog.map(id)) else {
        return (StatusCode::NOT_FOUND, "Map not found").into_response();
    };
    if !map.visible_to(ctx.user.as_deref()) {
        return (StatusCode::FORBIDDEN, PERMISSION_MESSAGE).into_response();
    }

    metrics::record_viewer_config("copy");
    info!(map_id = map.id, "Copying map configuration");

    let mut draft = MapDraft::from_record(&map);
    draft.id = None;
    draft.title = state.config.map.default_title.clone();
    draft.abstract_text = state.config.map.default_abstract.clone();
    draft.owner = ctx.user.clone();
    Json(draft.viewer_json()).into_response()
}

/// Decoded query or form parameters, repeated keys preserved.
struct Params(Vec<(String, String)>);

impl Params {
    fn from_query(query: Option<&str>) -> Self {
        match query {
            Some(query) => Self(
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect(),
            ),
            None => Self(Vec::new()),
        }
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(bytes).into_owned().collect())
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

async fn form_params(request: Request<Body>) -> Result<Params, Response> {
    match axum::body::to_bytes(request.into_body(), MAX_FORM_BYTES).await {
        Ok(bytes) => Ok(Params::from_bytes(&bytes)),
        Err(_) => Err((StatusCode::PAYLOAD_TOO_LARGE, "Form body too large").into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_repeated_keys() {
        let params = Params::from_query(Some("layer=a&copy=1&layer=b"));
        assert_eq!(params.all("layer"), vec!["a", "b"]);
        assert_eq!(params.first("copy"), Some("1"));
        assert!(params.first("missing").is_none());
    }

    #[test]
    fn test_params_decode_form_encoding() {
        let params = Params::from_bytes(b"layer=geonode%3Aroads&note=a+b");
        assert_eq!(params.all("layer"), vec!["geonode:roads"]);
        assert_eq!(params.first("note"), Some("a b"));
    }

    #[test]
    fn test_params_empty_query() {
        let params = Params::from_query(None);
        assert!(params.all("layer").is_empty());
    }
}
