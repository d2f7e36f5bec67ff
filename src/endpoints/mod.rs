//! Remote service endpoint registry surface.

pub mod handlers;

pub use handlers::add_endpoint;
