//! Model System - What the relation sharing layer needs from a model
//!
//! - `core_trait`: the `RelatableModel` capability trait and `ModelRef` handle
//! - `key`: identity values used for reconciliation
//! - `value`: contents of relation slots
//! - `collection`: ordered result sets with positional replacement
//! - `record`: attribute-map model implementation

pub mod collection;
pub mod core_trait;
pub mod key;
pub mod record;
pub mod value;

pub use collection::ModelCollection;
pub use core_trait::{attribute_key, same_model, ModelRef, RelatableModel};
pub use key::ModelKey;
pub use record::Record;
pub use value::RelationValue;
