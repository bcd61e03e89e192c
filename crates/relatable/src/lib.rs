//! # elif-relatable: Relationship sharing for elif.rs models
//!
//! Relations loaded through this crate hand parent state down to the models
//! they return, so `child.parent` or a shared parent attribute never needs
//! another query. Collections are also reconciled against instances the
//! parent already holds, carrying pivot records across.
//!
//! Querying and hydration belong to `elif-orm`; this crate only works on
//! models already in memory.

pub mod config;
pub mod error;
pub mod model;
pub mod relationships;

// Re-export core traits and types
pub use config::*;
pub use error::*;
pub use model::*;
pub use relationships::*;
