//! Map viewer subsystem.
//!
//! # Data Flow
//! ```text
//! /maps/new, /maps/{id}, /sites/{slug}
//!     → handlers.rs (params, visibility, case selection)
//!     → assemble.rs (drafts, blocks, bbox/center/zoom fitting)
//!     → bbox.rs + projection.rs (extent math)
//!     → worldmap.rs (client-specific conversion, applied last)
//!     → JSON document for the WorldMap client
//! ```

pub mod assemble;
pub mod bbox;
pub mod handlers;
pub mod projection;
pub mod worldmap;

pub use assemble::MapDraft;
pub use bbox::BoundingBox;
