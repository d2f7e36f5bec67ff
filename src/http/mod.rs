//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware, shared state)
//!     → request.rs (request ID stamping, cookie access)
//!     → handler modules (proxy, viewer, stats, endpoints)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
