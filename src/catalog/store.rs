//! In-memory catalog store.
//!
//! # Responsibilities
//! - Hold the layers, maps, endpoints and visit counters the handlers read
//! - Seed records from a JSON fixture file at startup
//! - Serve lock-free concurrent lookups to every handler
//!
//! # Design Decisions
//! - DashMap per record family; handlers clone records out rather than
//!   holding references across await points
//! - Topic categories are fixed at construction time
//! - Endpoint ids are assigned from an atomic counter, continuing after the
//!   highest fixture id

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::catalog::types::{
    EndpointRecord, LayerRecord, LayerStats, MapRecord, TopicCategory,
};

/// Error raised while loading catalog fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shape of a catalog fixture file. Every list is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFixtures {
    #[serde(default)]
    pub layers: Vec<LayerRecord>,

    #[serde(default)]
    pub maps: Vec<MapRecord>,

    #[serde(default)]
    pub endpoints: Vec<EndpointRecord>,

    /// Replaces the built-in ISO category list when present.
    #[serde(default)]
    pub topic_categories: Option<Vec<TopicCategory>>,
}

/// The records the gateway serves views of.
pub struct Catalog {
    layers: DashMap<i64, LayerRecord>,
    maps: DashMap<i64, MapRecord>,
    stats: DashMap<i64, LayerStats>,
    endpoints: DashMap<i64, EndpointRecord>,
    categories: Vec<TopicCategory>,
    next_endpoint_id: AtomicI64,
}

impl Catalog {
    /// Create an empty catalog with the built-in ISO topic categories.
    pub fn new() -> Self {
        Self::from_fixture_set(CatalogFixtures::default())
    }

    /// Load a catalog from a JSON fixture file.
    pub fn from_fixtures(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path)?;
        let fixtures: CatalogFixtures = serde_json::from_str(&content)?;
        let catalog = Self::from_fixture_set(fixtures);
        info!(
            path = %path.display(),
            layers = catalog.layer_count(),
            maps = catalog.map_count(),
            "Catalog fixtures loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from an already-parsed fixture set.
    pub fn from_fixture_set(fixtures: CatalogFixtures) -> Self {
        let layers = DashMap::new();
        for layer in fixtures.layers {
            layers.insert(layer.id, layer);
        }
        let maps = DashMap::new();
        for map in fixtures.maps {
            maps.insert(map.id, map);
        }
        let endpoints = DashMap::new();
        let mut max_endpoint_id = 0;
        for endpoint in fixtures.endpoints {
            max_endpoint_id = max_endpoint_id.max(endpoint.id);
            endpoints.insert(endpoint.id, endpoint);
        }

        Self {
            layers,
            maps,
            stats: DashMap::new(),
            endpoints,
            categories: fixtures
                .topic_categories
                .unwrap_or_else(default_topic_categories),
            next_endpoint_id: AtomicI64::new(max_endpoint_id + 1),
        }
    }

    pub fn insert_layer(&self, layer: LayerRecord) {
        self.layers.insert(layer.id, layer);
    }

    pub fn insert_map(&self, map: MapRecord) {
        self.maps.insert(map.id, map);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    /// Look a layer up by its qualified typename.
    pub fn layer_by_typename(&self, typename: &str) -> Option<LayerRecord> {
        self.layers
            .iter()
            .find(|entry| entry.typename == typename)
            .map(|entry| entry.value().clone())
    }

    /// Look a layer up by the name the viewer uses.
    pub fn layer_by_alternate(&self, alternate: &str) -> Option<LayerRecord> {
        self.layers
            .iter()
            .find(|entry| entry.alternate == alternate)
            .map(|entry| entry.value().clone())
    }

    pub fn map(&self, id: i64) -> Option<MapRecord> {
        self.maps.get(&id).map(|entry| entry.value().clone())
    }

    /// Look a map up by its hosted-site slug.
    pub fn map_by_url_suffix(&self, slug: &str) -> Option<MapRecord> {
        self.maps
            .iter()
            .find(|entry| entry.url_suffix.as_deref() == Some(slug))
            .map(|entry| entry.value().clone())
    }

    /// Count one visit against a layer, creating its counter row on first
    /// contact. A visit counts as unique when the row was just created or
    /// the caller's session had not seen the layer before.
    pub fn record_visit(&self, layer_id: i64, first_in_session: bool) -> LayerStats {
        let mut created = false;
        let mut stats = self.stats.entry(layer_id).or_insert_with(|| {
            created = true;
            LayerStats::default()
        });
        stats.visits += 1;
        if first_in_session || created {
            stats.uniques += 1;
        }
        *stats
    }

    pub fn stats(&self, layer_id: i64) -> Option<LayerStats> {
        self.stats.get(&layer_id).map(|entry| *entry.value())
    }

    /// Register a remote service endpoint and assign it an id.
    pub fn add_endpoint(
        &self,
        url: String,
        description: String,
        owner: Option<String>,
    ) -> EndpointRecord {
        let id = self.next_endpoint_id.fetch_add(1, Ordering::SeqCst);
        let record = EndpointRecord {
            id,
            url,
            description,
            owner,
        };
        self.endpoints.insert(id, record.clone());
        record
    }

    pub fn endpoint(&self, id: i64) -> Option<EndpointRecord> {
        self.endpoints.get(&id).map(|entry| entry.value().clone())
    }

    pub fn topic_categories(&self) -> &[TopicCategory] {
        &self.categories
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn default_topic_categories() -> Vec<TopicCategory> {
    [
        ("farming", "Farming"),
        ("biota", "Biota"),
        ("boundaries", "Boundaries"),
        (
            "climatologyMeteorologyAtmosphere",
            "Climatology Meteorology Atmosphere",
        ),
        ("economy", "Economy"),
        ("elevation", "Elevation"),
        ("environment", "Environment"),
        ("geoscientificInformation", "Geoscientific Information"),
        ("health", "Health"),
        ("imageryBaseMapsEarthCover", "Imagery Base Maps Earth Cover"),
        ("intelligenceMilitary", "Intelligence Military"),
        ("inlandWaters", "Inland Waters"),
        ("location", "Location"),
        ("oceans", "Oceans"),
        ("planningCadastre", "Planning Cadastre"),
        ("population", "Population"),
        ("society", "Society"),
        ("structure", "Structure"),
        ("transportation", "Transportation"),
        ("utilitiesCommunication", "Utilities Communication"),
    ]
    .into_iter()
    .map(|(identifier, description)| TopicCategory {
        identifier: identifier.to_string(),
        description: description.to_string(),
    })
    .collect()
}
