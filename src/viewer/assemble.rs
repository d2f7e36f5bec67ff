//! Viewer configuration assembly.
//!
//! # Data Flow
//! ```text
//! requested layer names
//!     → catalog lookup (unknown or invisible layers skipped)
//!     → running bbox merge, per-layer viewer blocks
//!     → center/zoom fitted to the merged extent
//!     → MapDraft (unsaved map) with base layers in front
//!     → viewer_json() document for the client
//! ```
//!
//! # Design Decisions
//! - Drafts are never persisted; every viewer document is assembled on
//!   demand from catalog records
//! - Each layer block carries the bbox merged so far, not the layer's own
//! - The access token is injected only into URLs pointing at the OGC
//!   server; remote services never see it

use serde_json::{json, Map as JsonMap, Value};
use tracing::debug;
use url::Url;

use crate::catalog::store::Catalog;
use crate::catalog::types::{LayerRecord, LayerStorage, MapLayerRecord, MapRecord};
use crate::config::schema::GatewayConfig;
use crate::proxy::allowlist::netloc;
use crate::session::UserContext;
use crate::viewer::bbox::{fit_zoom, BoundingBox};
use crate::viewer::projection::{llbbox_to_mercator, map_center};

/// A map being assembled for the viewer, saved or not.
#[derive(Debug, Clone)]
pub struct MapDraft {
    /// Catalog id, present only when the draft mirrors a saved map.
    pub id: Option<i64>,
    pub title: String,
    pub abstract_text: String,
    /// User the map would be saved under. Never serialized into the
    /// viewer document.
    pub owner: Option<String>,
    pub projection: String,
    pub center: (f64, f64),
    pub zoom: i64,
    pub layers: Vec<MapLayerRecord>,
}

impl MapDraft {
    /// An unsaved map carrying nothing but the configured defaults.
    pub fn empty(config: &GatewayConfig) -> Self {
        Self {
            id: None,
            title: config.map.default_title.clone(),
            abstract_text: config.map.default_abstract.clone(),
            owner: None,
            projection: config.map.default_crs.clone(),
            center: (config.map.default_center[0], config.map.default_center[1]),
            zoom: config.map.default_zoom,
            layers: base_maplayers(config),
        }
    }

    /// A draft mirroring a saved map.
    pub fn from_record(map: &MapRecord) -> Self {
        Self {
            id: Some(map.id),
            title: map.title.clone(),
            abstract_text: map.abstract_text.clone(),
            owner: map.owner.clone(),
            projection: map.projection.clone(),
            center: (map.center_x, map.center_y),
            zoom: map.zoom,
            layers: map.layers.clone(),
        }
    }

    /// Serialize the draft into the viewer's configuration document.
    pub fn viewer_json(&self) -> Value {
        let layers: Vec<Value> = self.layers.iter().map(layer_block).collect();
        let mut config = json!({
            "about": {
                "title": self.title,
                "abstract": self.abstract_text,
            },
            "map": {
                "projection": self.projection,
                "center": [self.center.0, self.center.1],
                "zoom": self.zoom,
                "layers": layers,
            },
        });
        if let Some(id) = self.id {
            config["id"] = json!(id);
        }
        config
    }
}

/// Build a draft for the requested layers, visibility checked against the
/// requester. Unknown names are skipped rather than failing the request.
pub fn assemble_from_layers(
    config: &GatewayConfig,
    catalog: &Catalog,
    ctx: &UserContext,
    layer_names: &[String],
) -> MapDraft {
    let crs = config.map.default_crs.clone();
    let mut draft = MapDraft::empty(config);
    let mut bbox: Option<BoundingBox> = None;

    for name in layer_names {
        let Some(layer) = catalog.layer_by_typename(name) else {
            debug!(layer = %name, "Requested layer not in catalog, skipping");
            continue;
        };
        if !layer.visible_to(ctx.user.as_deref()) {
            debug!(layer = %name, "Requested layer not visible to requester, skipping");
            continue;
        }

        let merged = match bbox {
            None => layer.bbox,
            Some(mut running) => {
                running.expand(&layer.bbox);
                running
            }
        };
        bbox = Some(merged);

        let block = wm_layer_block(&layer, &merged, &crs);
        draft
            .layers
            .push(build_maplayer(config, &layer, &block, ctx.access_token.as_deref()));
    }

    if let Some(bbox) = bbox {
        draft.center = map_center(&bbox, &crs);
        draft.zoom = fit_zoom(&bbox);
    }

    draft
}

/// The configured background layers, one viewer row each.
pub fn base_maplayers(config: &GatewayConfig) -> Vec<MapLayerRecord> {
    config
        .map
        .base_layers
        .iter()
        .map(|base| {
            let mut params = JsonMap::new();
            params.insert("title".to_string(), json!(base.title));
            params.insert("group".to_string(), json!(base.group));
            params.insert("fixed".to_string(), json!(true));
            if let Some(url) = &base.url {
                params.insert("url".to_string(), json!(url));
            }
            MapLayerRecord {
                name: base.name.clone(),
                ows_url: None,
                visibility: true,
                layer_params: Value::Object(params).to_string(),
                source_params: None,
            }
        })
        .collect()
}

/// One layer's viewer block: the stored params with the row's own name and
/// visibility written over them.
fn layer_block(maplayer: &MapLayerRecord) -> Value {
    let mut block = match serde_json::from_str::<Value>(&maplayer.layer_params) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({}),
    };
    block["name"] = json!(maplayer.name);
    block["visibility"] = json!(maplayer.visibility);
    block
}

/// The viewer block for an assembled layer. `merged` is the extent of
/// every layer included so far.
fn wm_layer_block(layer: &LayerRecord, merged: &BoundingBox, crs: &str) -> Value {
    let bbox_value = if crs == "EPSG:900913" {
        json!(llbbox_to_mercator(merged))
    } else {
        json!(merged.as_array())
    };
    json!({
        "local": true,
        "name": layer.alternate,
        "group": layer.category,
        "title": layer.title,
        "queryable": true,
        "tiled": true,
        "url": layer.ows_url,
        "srs": crs,
        "bbox": bbox_value,
    })
}

/// The stored row for one assembled layer. Remote-service layers carry
/// their connection in source_params and never receive the access token.
fn build_maplayer(
    config: &GatewayConfig,
    layer: &LayerRecord,
    block: &Value,
    access_token: Option<&str>,
) -> MapLayerRecord {
    match &layer.storage {
        LayerStorage::Remote { service } => {
            let url = inject_access_token(
                &service.base_url,
                access_token,
                &config.map.ogc_server_location,
            );
            MapLayerRecord {
                name: layer.typename.clone(),
                ows_url: Some(layer.ows_url.clone()),
                visibility: true,
                layer_params: block.to_string(),
                source_params: Some(
                    json!({
                        "ptype": service.ptype,
                        "remote": true,
                        "url": url,
                        "name": service.name,
                    })
                    .to_string(),
                ),
            }
        }
        LayerStorage::Local => {
            let url = inject_access_token(
                &layer.ows_url,
                access_token,
                &config.map.ogc_server_location,
            );
            MapLayerRecord {
                name: layer.typename.clone(),
                ows_url: Some(url),
                visibility: true,
                layer_params: block.to_string(),
                source_params: None,
            }
        }
    }
}

/// Append the access token to `url` when it points at the OGC server and
/// does not already carry one.
fn inject_access_token(url: &str, access_token: Option<&str>, ogc_location: &str) -> String {
    let Some(token) = access_token else {
        return url.to_string();
    };
    if url.contains("access_token") {
        return url.to_string();
    }
    let same_origin = match (Url::parse(url), Url::parse(ogc_location)) {
        (Ok(target), Ok(ogc)) => netloc(&target) == netloc(&ogc),
        _ => false,
    };
    if same_origin {
        format!("{url}?access_token={token}")
    } else {
        url.to_string()
    }
}
