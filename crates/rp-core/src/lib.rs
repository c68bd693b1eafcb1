//! repute/crates/rp-core/src/lib.rs
//!
//! The domain model and interface definitions for repute.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
