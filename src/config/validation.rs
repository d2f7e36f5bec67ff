//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Catch an allow-list that would reject every proxy request
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("proxy.allowed_hosts contains an empty entry")]
    BlankAllowedHost,

    #[error("proxy.allowed_hosts is empty, no OGC server is configured, and permissive mode is off; every proxy request would be rejected")]
    EmptyAllowList,

    #[error("proxy.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("listener.max_connections must be greater than zero")]
    ZeroConnectionLimit,

    #[error("session.cookie_name must not be empty")]
    BlankCookieName,

    #[error("map.default_crs {0:?} is not an EPSG code")]
    UnknownCrs(String),

    #[error("map.ogc_server_location {0:?} is not a valid URL")]
    InvalidOgcLocation(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config
        .proxy
        .allowed_hosts
        .iter()
        .any(|h| h.trim().is_empty())
    {
        errors.push(ValidationError::BlankAllowedHost);
    }

    if !config.proxy.permissive
        && config.proxy.allowed_hosts.is_empty()
        && config.map.ogc_server_location.is_empty()
    {
        errors.push(ValidationError::EmptyAllowList);
    }

    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnectionLimit);
    }

    if config.session.cookie_name.is_empty() {
        errors.push(ValidationError::BlankCookieName);
    }

    if !config.map.default_crs.starts_with("EPSG:") {
        errors.push(ValidationError::UnknownCrs(config.map.default_crs.clone()));
    }

    if !config.map.ogc_server_location.is_empty()
        && Url::parse(&config.map.ogc_server_location).is_err()
    {
        errors.push(ValidationError::InvalidOgcLocation(
            config.map.ogc_server_location.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBindAddress(_))));
    }

    #[test]
    fn test_empty_allow_list_without_ogc_server() {
        let mut config = GatewayConfig::default();
        config.proxy.allowed_hosts.clear();
        config.map.ogc_server_location.clear();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyAllowList));
    }

    #[test]
    fn test_permissive_mode_tolerates_empty_allow_list() {
        let mut config = GatewayConfig::default();
        config.proxy.allowed_hosts.clear();
        config.map.ogc_server_location.clear();
        config.proxy.permissive = true;

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_collected_together() {
        let mut config = GatewayConfig::default();
        config.timeouts.connect_secs = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout("connect_secs"),
                ValidationError::ZeroTimeout("request_secs"),
            ]
        );
    }

    #[test]
    fn test_zero_connection_limit_rejected() {
        let mut config = GatewayConfig::default();
        config.listener.max_connections = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroConnectionLimit));
    }

    #[test]
    fn test_non_epsg_crs_rejected() {
        let mut config = GatewayConfig::default();
        config.map.default_crs = "urn:ogc:def:crs:whatever".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownCrs(_))));
    }

    #[test]
    fn test_bad_ogc_location_rejected() {
        let mut config = GatewayConfig::default();
        config.map.ogc_server_location = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidOgcLocation(_))));
    }
}
