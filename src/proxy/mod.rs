//! Forwarding proxy subsystem.
//!
//! # Responsibilities
//! - Relay viewer requests to remote OGC services the browser cannot reach
//!   directly (cross-origin restrictions)
//! - Enforce the target host allow-list
//! - Refuse upstream redirects instead of following them

pub mod allowlist;
pub mod forward;

pub use allowlist::HostAllowlist;
pub use forward::proxy_handler;
