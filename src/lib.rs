//! WorldMap Gateway Library

pub mod catalog;
pub mod config;
pub mod endpoints;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod session;
pub mod stats;
pub mod viewer;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
