//! Per-layer visit accounting.

pub mod visits;

pub use visits::increment_layer_stats;
