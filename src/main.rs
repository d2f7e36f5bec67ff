//! WorldMap Gateway
//!
//! HTTP gateway for a GeoNode-lineage map portal, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌─────────────────────────────────────────────────────┐
//!                              │                  WORLDMAP GATEWAY                    │
//!                              │                                                      │
//!     Browser / Viewer         │  ┌─────────┐    ┌──────────────────────────┐        │
//!     ─────────────────────────┼─▶│  http   │───▶│  proxy (allow-list +     │────────┼──▶ OWS /
//!                              │  │ server  │    │  selective header relay) │        │    remote
//!                              │  └────┬────┘    └──────────────────────────┘        │    services
//!                              │       │                                             │
//!                              │       ├────────▶ viewer (map config assembly)       │
//!                              │       ├────────▶ stats  (layer visit counters)      │
//!                              │       └────────▶ endpoints (service registry)       │
//!                              │                        │                            │
//!                              │                        ▼                            │
//!                              │            ┌───────────────────────┐                │
//!                              │            │  catalog + sessions   │                │
//!                              │            │  (in-memory stores)   │                │
//!                              │            └───────────────────────┘                │
//!                              │                                                      │
//!                              │  ┌────────────────────────────────────────────────┐ │
//!                              │  │            Cross-Cutting Concerns               │ │
//!                              │  │  ┌─────────┐ ┌──────────────┐ ┌─────────────┐  │ │
//!                              │  │  │ config  │ │observability │ │  lifecycle  │  │ │
//!                              │  │  │         │ │ logs+metrics │ │  shutdown   │  │ │
//!                              │  │  └─────────┘ └──────────────┘ └─────────────┘  │ │
//!                              │  └────────────────────────────────────────────────┘ │
//!                              └─────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worldmap_gateway::catalog::store::Catalog;
use worldmap_gateway::config::loader::load_config;
use worldmap_gateway::session::SessionStore;
use worldmap_gateway::{GatewayConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "worldmap-gateway")]
#[command(about = "HTTP gateway for the WorldMap portal", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worldmap_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("worldmap-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_hosts = config.proxy.allowed_hosts.len(),
        permissive = config.proxy.permissive,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let catalog = match &config.catalog.fixtures {
        Some(path) => Catalog::from_fixtures(Path::new(path))?,
        None => Catalog::new(),
    };
    let sessions = SessionStore::new();

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            worldmap_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(config), Arc::new(catalog), Arc::new(sessions))?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
