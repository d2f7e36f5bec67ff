//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every portal handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Hold the shared application state handlers extract
//! - Serve until shutdown is signalled, draining in-flight requests
//!
//! # Data Flow
//! ```text
//! listener → Router
//!     /proxy, /proxy/            → proxy::forward::proxy_handler
//!     /ajax-layer-stats[/]       → stats::visits::increment_layer_stats
//!     /maps/new                  → viewer::handlers::new_map
//!     /maps/{mapid}              → viewer::handlers::map_view
//!     /sites/{site}              → viewer::handlers::site_view
//!     /endpoints                 → endpoints::handlers::add_endpoint
//!     /status                    → status_handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::store::Catalog;
use crate::config::GatewayConfig;
use crate::endpoints::add_endpoint;
use crate::http::request::RequestIdLayer;
use crate::proxy::allowlist::HostAllowlist;
use crate::proxy::forward::proxy_handler;
use crate::session::SessionStore;
use crate::stats::increment_layer_stats;
use crate::viewer::handlers::{map_view, new_map, site_view};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub allowlist: Arc<HostAllowlist>,
    pub upstream: reqwest::Client,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the shared stores. Fails only when
    /// the upstream HTTP client cannot be constructed.
    pub fn new(
        config: Arc<GatewayConfig>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
    ) -> Result<Self, reqwest::Error> {
        let allowlist = Arc::new(HostAllowlist::from_config(&config));

        // Redirects must surface to the proxy handler, never be followed.
        let upstream = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .build()?;

        let state = AppState {
            config: config.clone(),
            catalog,
            sessions,
            allowlist,
            upstream,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/status", get(status_handler))
            .route("/proxy", any(proxy_handler))
            .route("/proxy/", any(proxy_handler))
            .route("/ajax-layer-stats", post(increment_layer_stats))
            .route("/ajax-layer-stats/", post(increment_layer_stats))
            .route("/maps/new", any(new_map))
            .route("/maps/{mapid}", get(map_view))
            .route("/sites/{site}", get(site_view))
            .route("/endpoints", post(add_endpoint))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown channel fires or Ctrl+C arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct SystemStatus {
    version: &'static str,
    status: &'static str,
}

/// `GET /status`
async fn status_handler() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Wait for Ctrl+C or a programmatic shutdown trigger.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
