//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing log events (request-id field attached by http/request.rs)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log stream (tracing-subscriber fmt layer, set up in main)
//!     → Prometheus scrape listener (own address, optional)
//! ```

pub mod metrics;
