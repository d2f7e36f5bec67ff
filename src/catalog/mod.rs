//! Portal catalog subsystem.
//!
//! # Responsibilities
//! - Define the record types the gateway serves views of
//! - Hold them in a concurrent in-memory store
//! - Seed the store from JSON fixtures at startup

pub mod store;
pub mod types;

pub use store::{Catalog, CatalogFixtures, FixtureError};
pub use types::{
    EndpointRecord, LayerRecord, LayerStats, LayerStorage, MapLayerRecord, MapRecord,
    ServiceRecord, TopicCategory,
};
