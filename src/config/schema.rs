//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the WorldMap gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Forwarding proxy settings (allow-list, body cap).
    pub proxy: ProxyConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Map viewer defaults and OGC server location.
    pub map: MapConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Catalog fixture settings.
    pub catalog: CatalogConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum in-flight requests; further requests queue (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Forwarding proxy configuration.
///
/// The proxy only relays requests whose target host appears in
/// `allowed_hosts` (the OGC server host is always trusted in addition).
/// Entries follow Django's `ALLOWED_HOSTS` conventions: exact hostnames,
/// leading-dot suffix patterns (".example.com" matches the domain and any
/// subdomain), or "*" to match everything.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Hostnames the proxy may forward to.
    pub allowed_hosts: Vec<String>,

    /// Skip the allow-list check entirely. Development only.
    pub permissive: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            permissive: false,
            max_body_bytes: 10 * 1024 * 1024, // 10MB, WFS transactions can be large
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie issued by the portal.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
        }
    }
}

/// Map viewer defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    /// Projection for new maps (e.g., "EPSG:900913").
    pub default_crs: String,

    /// Center of an empty map, in projection units.
    pub default_center: [f64; 2],

    /// Zoom level of an empty map.
    pub default_zoom: i64,

    /// Title given to unsaved maps.
    pub default_title: String,

    /// Abstract given to unsaved maps.
    pub default_abstract: String,

    /// Introductory text placed in the viewer's about panel.
    pub intro_text: String,

    /// Base URL of the OGC server (GeoServer) backing local layers.
    pub ogc_server_location: String,

    /// Background layers included in every new map.
    pub base_layers: Vec<BaseLayerConfig>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_crs: "EPSG:900913".to_string(),
            default_center: [0.0, 0.0],
            default_zoom: 0,
            default_title: String::new(),
            default_abstract: String::new(),
            intro_text: "Placeholder for intro text".to_string(),
            ogc_server_location: "http://localhost:8080/geoserver/".to_string(),
            base_layers: vec![BaseLayerConfig {
                name: "mapnik".to_string(),
                title: "OpenStreetMap".to_string(),
                group: "background".to_string(),
                url: None,
            }],
        }
    }
}

/// A background layer included in every new map.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaseLayerConfig {
    /// Layer name as known to the viewer.
    pub name: String,

    /// Human-readable title.
    pub title: String,

    /// Viewer group, almost always "background".
    #[serde(default = "default_base_layer_group")]
    pub group: String,

    /// Tile service URL, if the layer is not built into the viewer.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_base_layer_group() -> String {
    "background".to_string()
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for upstream requests, in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Total timeout for a single upstream exchange, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            upstream_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a JSON fixture file seeding layers, maps and categories.
    pub fixtures: Option<String>,
}
