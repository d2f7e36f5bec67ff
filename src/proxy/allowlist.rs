//! Proxy target allow-list.
//!
//! Matching follows Django's ALLOWED_HOSTS conventions: exact hostnames
//! compare case-insensitively, a leading dot matches the domain and any
//! subdomain, and "*" matches everything. The OGC server's hostname is
//! trusted without an explicit entry, so viewer traffic to the portal's
//! own GeoServer always passes.

use url::Url;

use crate::config::schema::GatewayConfig;

/// Compiled allow-list plus the OGC server identity for same-site checks.
#[derive(Debug, Clone)]
pub struct HostAllowlist {
    patterns: Vec<String>,
    trusted_netloc: String,
}

impl HostAllowlist {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut patterns: Vec<String> = config
            .proxy
            .allowed_hosts
            .iter()
            .map(|host| host.trim().to_lowercase())
            .collect();

        let mut trusted_netloc = String::new();
        if !config.map.ogc_server_location.is_empty() {
            if let Ok(url) = Url::parse(&config.map.ogc_server_location) {
                if let Some(host) = url.host_str() {
                    patterns.push(host.to_lowercase());
                    trusted_netloc = netloc(&url);
                }
            }
        }

        Self {
            patterns,
            trusted_netloc,
        }
    }

    /// Whether the proxy may forward to `host`.
    pub fn allows(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        let host = host.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| pattern == "*" || host_matches(&host, pattern))
    }

    /// host[:port] of the OGC server; empty when none is configured.
    pub fn trusted_netloc(&self) -> &str {
        &self.trusted_netloc
    }

    /// Whether `url` points at the OGC server itself.
    pub fn is_same_site(&self, url: &Url) -> bool {
        !self.trusted_netloc.is_empty()
            && matches!(url.scheme(), "http" | "https")
            && netloc(url) == self.trusted_netloc
    }
}

fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    match pattern.strip_prefix('.') {
        Some(domain) => host == domain || host.ends_with(pattern),
        None => host == pattern,
    }
}

/// host[:port] of a URL, the port omitted when it is the scheme default.
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
