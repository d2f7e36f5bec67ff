//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (proxy traffic, viewer configs, layer visits)
//! - Expose a Prometheus-compatible metrics endpoint on its own listener
//! - Keep metric updates cheap enough for the request hot path
//!
//! # Metrics
//! - `gateway_proxy_requests_total` (counter): proxy requests by method,
//!   status and outcome
//! - `gateway_proxy_request_duration_seconds` (histogram): proxy latency
//!   by outcome
//! - `gateway_viewer_configs_total` (counter): viewer configurations
//!   assembled, by assembly case
//! - `gateway_layer_visits_total` (counter): layer visits counted, split
//!   into unique and repeat

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

/// Install the global Prometheus recorder and its scrape listener. Must be
/// called from within the Tokio runtime. Failure to install is logged and
/// the gateway keeps running without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            info!(address = %addr, "Metrics exporter listening");
        }
        Err(error) => {
            error!(%error, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "gateway_proxy_requests_total",
        Unit::Count,
        "Proxy requests by method, status and outcome"
    );
    describe_histogram!(
        "gateway_proxy_request_duration_seconds",
        Unit::Seconds,
        "Proxy request latency by outcome"
    );
    describe_counter!(
        "gateway_viewer_configs_total",
        Unit::Count,
        "Viewer configurations assembled by case"
    );
    describe_counter!(
        "gateway_layer_visits_total",
        Unit::Count,
        "Layer visits counted, split into unique and repeat"
    );
}

/// Count one proxy request and record its latency.
pub fn record_proxy_request(method: &str, status: u16, outcome: &'static str, started: Instant) {
    counter!(
        "gateway_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("gateway_proxy_request_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Count one assembled viewer configuration.
pub fn record_viewer_config(case: &'static str) {
    counter!("gateway_viewer_configs_total", "case" => case).increment(1);
}

/// Count one layer visit.
pub fn record_layer_visit(unique: bool) {
    let kind = if unique { "unique" } else { "repeat" };
    counter!("gateway_layer_visits_total", "kind" => kind).increment(1);
}
