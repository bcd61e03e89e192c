//! Relationships Module - Relation kinds with parent sharing and reconciliation

pub mod sharing;
pub mod traits;
pub mod has_one;
pub mod has_many;
pub mod belongs_to;
pub mod belongs_to_many;

#[cfg(test)]
mod sharing_tests;

// Re-export main types
pub use sharing::*;
pub use traits::Relatable;
pub use has_one::*;
pub use has_many::*;
pub use belongs_to::*;
pub use belongs_to_many::*;
