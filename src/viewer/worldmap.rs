//! GeoExplorer to WorldMap client conversion.
//!
//! The assembled document starts in plain GeoExplorer shape. The WorldMap
//! client additionally expects the topic category list, the proxy prefix,
//! an edit flag, per-layer annotations and the group index, so every
//! served document passes through here last.
//!
//! Three kinds of layer block can appear in a document:
//! - background layers, no "local" marker: left untouched
//! - portal layers, "local": true: catalog styles filled in when missing
//! - remote registry layers, "local": false: styles cleared and the
//!   endpoint URL restored from the stored row

use serde_json::{json, Value};

use crate::catalog::store::Catalog;
use crate::catalog::types::MapLayerRecord;

/// Prefix the client prepends to cross-origin requests.
const PROXY_PREFIX: &str = "/proxy/?url=";

/// Rework a GeoExplorer config document in place for the WorldMap client.
///
/// `maplayers` are the stored rows behind the document's layer blocks;
/// remote registry blocks read their endpoint URL from them.
pub fn geoexplorer_to_worldmap(
    config: &mut Value,
    catalog: &Catalog,
    intro_text: &str,
    maplayers: &[MapLayerRecord],
) {
    let mut categories: Vec<Value> = catalog
        .topic_categories()
        .iter()
        .map(|category| json!([category.identifier, category.description]))
        .collect();
    categories.push(json!(["General", "General"]));
    config["topic_categories"] = Value::Array(categories);

    config["proxy"] = json!(PROXY_PREFIX);
    config["edit_map"] = json!(true);

    let mut groups: Vec<String> = Vec::new();
    if let Some(blocks) = config
        .pointer_mut("/map/layers")
        .and_then(Value::as_array_mut)
    {
        for block in blocks.iter_mut() {
            annotate_layer_block(block, catalog, maplayers, &mut groups);
        }
    }

    config["map"]["groups"] = groups
        .into_iter()
        .map(|group| json!({"expanded": "true", "group": group}))
        .collect::<Value>();

    config["about"]["introtext"] = json!(intro_text);
}

/// Apply the WorldMap per-layer additions to one block.
fn annotate_layer_block(
    block: &mut Value,
    catalog: &Catalog,
    maplayers: &[MapLayerRecord],
    groups: &mut Vec<String>,
) {
    // Background layers carry no "local" marker and stay untouched.
    let Some(local) = block.get("local").and_then(Value::as_bool) else {
        return;
    };

    if let Some(group) = block.get("group").and_then(Value::as_str) {
        if !groups.iter().any(|seen| seen == group) {
            groups.push(group.to_string());
        }
    }

    // TODO derive llbbox from the stored layer extent instead of the world box
    block["llbbox"] = json!([-180, -90, 180, 90]);

    let name = block
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();

    if local {
        let has_styles = block
            .as_object()
            .map_or(false, |fields| fields.contains_key("styles"));
        if !has_styles {
            if let Some(layer) = catalog.layer_by_alternate(&name) {
                block["styles"] = json!(layer.styles);
            }
        }
    } else {
        block["styles"] = json!("");
        if let Some(maplayer) = maplayers.iter().find(|ml| ml.name == name) {
            if let Some(ows_url) = &maplayer.ows_url {
                block["url"] = json!(ows_url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{LayerRecord, LayerStorage};
    use crate::viewer::bbox::BoundingBox;

    fn catalog_with_styled_layer() -> Catalog {
        let catalog = Catalog::new();
        catalog.insert_layer(LayerRecord {
            id: 1,
            typename: "geonode:roads".to_string(),
            alternate: "geonode:roads".to_string(),
            title: "Roads".to_string(),
            bbox: BoundingBox::WORLD,
            category: "transportation".to_string(),
            styles: vec!["roads_classified".to_string(), "simple".to_string()],
            ows_url: "http://localhost:8080/geoserver/wms".to_string(),
            storage: LayerStorage::Local,
            public: true,
            owner: None,
        });
        catalog
    }

    fn base_document(layers: Value) -> Value {
        json!({
            "about": {"title": "", "abstract": ""},
            "map": {
                "projection": "EPSG:900913",
                "center": [0.0, 0.0],
                "zoom": 0,
                "layers": layers,
            },
        })
    }

    #[test]
    fn test_adds_portal_fields() {
        let catalog = Catalog::new();
        let mut config = base_document(json!([]));
        geoexplorer_to_worldmap(&mut config, &catalog, "Welcome", &[]);

        assert_eq!(config["proxy"], "/proxy/?url=");
        assert_eq!(config["edit_map"], true);
        assert_eq!(config["about"]["introtext"], "Welcome");
        assert_eq!(config["map"]["groups"], json!([]));

        let categories = config["topic_categories"].as_array().unwrap();
        assert_eq!(categories.last().unwrap(), &json!(["General", "General"]));
        assert!(categories.len() > 1);
    }

    #[test]
    fn test_background_blocks_left_alone() {
        let catalog = Catalog::new();
        let mut config = base_document(json!([
            {"name": "mapnik", "group": "background", "fixed": true}
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &[]);

        let block = &config["map"]["layers"][0];
        assert!(block.get("llbbox").is_none());
        assert!(block.get("styles").is_none());
        // Background groups never reach the group index.
        assert_eq!(config["map"]["groups"], json!([]));
    }

    #[test]
    fn test_groups_deduped_in_first_appearance_order() {
        let catalog = Catalog::new();
        let mut config = base_document(json!([
            {"local": true, "name": "a", "group": "transportation"},
            {"local": true, "name": "b", "group": "boundaries"},
            {"local": true, "name": "c", "group": "transportation"},
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &[]);

        assert_eq!(
            config["map"]["groups"],
            json!([
                {"expanded": "true", "group": "transportation"},
                {"expanded": "true", "group": "boundaries"},
            ])
        );
    }

    #[test]
    fn test_local_block_gets_catalog_styles_when_missing() {
        let catalog = catalog_with_styled_layer();
        let mut config = base_document(json!([
            {"local": true, "name": "geonode:roads", "group": "transportation"}
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &[]);

        let block = &config["map"]["layers"][0];
        assert_eq!(block["styles"], json!(["roads_classified", "simple"]));
        assert_eq!(block["llbbox"], json!([-180, -90, 180, 90]));
    }

    #[test]
    fn test_local_block_keeps_existing_styles() {
        let catalog = catalog_with_styled_layer();
        let mut config = base_document(json!([
            {"local": true, "name": "geonode:roads", "group": "transportation", "styles": ["mine"]}
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &[]);

        assert_eq!(config["map"]["layers"][0]["styles"], json!(["mine"]));
    }

    #[test]
    fn test_remote_block_cleared_styles_and_url_restored() {
        let catalog = Catalog::new();
        let rows = vec![MapLayerRecord {
            name: "hypermap:market".to_string(),
            ows_url: Some("http://registry.example.org/wmts/market/tile.png".to_string()),
            visibility: true,
            layer_params: String::new(),
            source_params: None,
        }];
        let mut config = base_document(json!([
            {"local": false, "name": "hypermap:market", "group": "economy", "url": "stale"}
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &rows);

        let block = &config["map"]["layers"][0];
        assert_eq!(block["styles"], json!(""));
        assert_eq!(
            block["url"],
            "http://registry.example.org/wmts/market/tile.png"
        );
    }

    #[test]
    fn test_remote_block_without_row_keeps_url() {
        let catalog = Catalog::new();
        let mut config = base_document(json!([
            {"local": false, "name": "hypermap:orphan", "group": "economy", "url": "original"}
        ]));
        geoexplorer_to_worldmap(&mut config, &catalog, "", &[]);

        assert_eq!(config["map"]["layers"][0]["url"], "original");
    }
}
