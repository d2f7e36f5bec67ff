//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Seed catalog → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C / SIGTERM / trigger() → Stop accepting → Drain in-flight → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
