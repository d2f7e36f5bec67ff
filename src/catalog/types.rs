//! Catalog record types.
//!
//! These are the portal entities the gateway serves views of: published
//! layers, saved maps, the layers a map contains, registered service
//! endpoints and ISO topic categories. All types derive Serde traits so
//! fixtures can seed the catalog from JSON.

use serde::{Deserialize, Serialize};

use crate::viewer::bbox::BoundingBox;

fn default_true() -> bool {
    true
}

/// How a layer's data is reached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerStorage {
    /// Served by the portal's own OGC server.
    #[default]
    Local,
    /// Registered from an external map service.
    Remote { service: ServiceRecord },
}

/// A remote map service a layer can come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,

    /// Viewer source plugin type, e.g. "gxp_hypermap".
    pub ptype: String,

    /// Service base URL.
    pub base_url: String,
}

/// A published layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: i64,

    /// Qualified name used in OWS requests, e.g. "geonode:roads".
    pub typename: String,

    /// Name the viewer addresses the layer by.
    pub alternate: String,

    pub title: String,

    /// Extent in lon/lat degrees.
    pub bbox: BoundingBox,

    /// Thematic category; doubles as the viewer group.
    #[serde(default)]
    pub category: String,

    /// Named styles published for the layer.
    #[serde(default)]
    pub styles: Vec<String>,

    /// OWS endpoint serving this layer.
    pub ows_url: String,

    #[serde(default)]
    pub storage: LayerStorage,

    #[serde(default = "default_true")]
    pub public: bool,

    #[serde(default)]
    pub owner: Option<String>,
}

impl LayerRecord {
    /// Whether `user` may see this layer.
    pub fn visible_to(&self, user: Option<&str>) -> bool {
        if self.public {
            return true;
        }
        matches!((self.owner.as_deref(), user), (Some(owner), Some(u)) if owner == u)
    }
}

/// A saved map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default = "default_true")]
    pub public: bool,

    /// Projection the viewer runs in, e.g. "EPSG:900913".
    pub projection: String,

    #[serde(default)]
    pub center_x: f64,

    #[serde(default)]
    pub center_y: f64,

    #[serde(default)]
    pub zoom: i64,

    /// Slug for the hosted-site shortcut route, when the map fronts one.
    #[serde(default)]
    pub url_suffix: Option<String>,

    /// Layers in draw order, lowest first.
    #[serde(default)]
    pub layers: Vec<MapLayerRecord>,
}

impl MapRecord {
    /// Whether `user` may see this map.
    pub fn visible_to(&self, user: Option<&str>) -> bool {
        if self.public {
            return true;
        }
        matches!((self.owner.as_deref(), user), (Some(owner), Some(u)) if owner == u)
    }
}

/// A layer's membership in a map, viewer state included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayerRecord {
    /// Name the viewer addresses the layer by.
    pub name: String,

    /// OWS endpoint for the layer, access token included when one applies.
    #[serde(default)]
    pub ows_url: Option<String>,

    #[serde(default = "default_true")]
    pub visibility: bool,

    /// Viewer-facing layer state, stored as serialized JSON.
    #[serde(default)]
    pub layer_params: String,

    /// Source plugin parameters, stored as serialized JSON.
    #[serde(default)]
    pub source_params: Option<String>,
}

/// Visit counters for a layer.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LayerStats {
    pub visits: u64,
    pub uniques: u64,
}

/// A registered remote service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub id: i64,
    pub url: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub owner: Option<String>,
}

/// An ISO 19115 topic category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCategory {
    pub identifier: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_layer(owner: Option<&str>) -> LayerRecord {
        LayerRecord {
            id: 1,
            typename: "geonode:secret".to_string(),
            alternate: "geonode:secret".to_string(),
            title: "Secret".to_string(),
            bbox: BoundingBox::WORLD,
            category: String::new(),
            styles: Vec::new(),
            ows_url: "http://localhost:8080/geoserver/wms".to_string(),
            storage: LayerStorage::Local,
            public: false,
            owner: owner.map(str::to_string),
        }
    }

    #[test]
    fn test_public_layer_visible_to_anyone() {
        let mut layer = private_layer(Some("alice"));
        layer.public = true;
        assert!(layer.visible_to(None));
        assert!(layer.visible_to(Some("bob")));
    }

    #[test]
    fn test_private_layer_visible_to_owner_only() {
        let layer = private_layer(Some("alice"));
        assert!(layer.visible_to(Some("alice")));
        assert!(!layer.visible_to(Some("bob")));
        assert!(!layer.visible_to(None));
    }

    #[test]
    fn test_ownerless_private_layer_hidden_from_everyone() {
        let layer = private_layer(None);
        assert!(!layer.visible_to(None));
        assert!(!layer.visible_to(Some("alice")));
    }

    #[test]
    fn test_layer_storage_fixture_tag() {
        let layer: LayerRecord = serde_json::from_str(
            r#"{
                "id": 7,
                "typename": "hypermap:roads",
                "alternate": "hypermap:roads",
                "title": "Roads",
                "bbox": {"minx": -10.0, "miny": -5.0, "maxx": 10.0, "maxy": 5.0},
                "ows_url": "http://warper.example.org/wms",
                "storage": {
                    "kind": "remote",
                    "service": {
                        "name": "warper",
                        "ptype": "gxp_hypermap",
                        "base_url": "http://warper.example.org/"
                    }
                }
            }"#,
        )
        .unwrap();

        match layer.storage {
            LayerStorage::Remote { service } => {
                assert_eq!(service.ptype, "gxp_hypermap");
            }
            LayerStorage::Local => panic!("expected remote storage"),
        }
        // Omitted fields fall back to defaults.
        assert!(layer.public);
        assert!(layer.styles.is_empty());
    }

    #[test]
    fn test_map_record_abstract_rename() {
        let map: MapRecord = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Harbor",
                "abstract": "Boston harbor depths",
                "projection": "EPSG:900913"
            }"#,
        )
        .unwrap();
        assert_eq!(map.abstract_text, "Boston harbor depths");
        assert!(map.layers.is_empty());
    }
}
