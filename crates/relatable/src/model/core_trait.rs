//! Core Relatable Trait - Capability contract a model offers to relation sharing
//!
//! The sharing machinery never creates or destroys models. It only reads keys
//! and attributes and writes relation slots through this trait, so any model
//! representation (typed structs, attribute maps) can take part.

use std::fmt::Debug;
use std::sync::Arc;

use super::key::ModelKey;
use super::value::RelationValue;

/// Shared handle to a model instance.
///
/// Parents and children reference each other through relation slots, so
/// models are shared rather than owned by any one collection.
pub type ModelRef = Arc<dyn RelatableModel>;

/// Capabilities a model must expose to receive shared relations
pub trait RelatableModel: Debug + Send + Sync {
    /// Model name used in log output (usually the table name)
    fn model_name(&self) -> &str;

    /// Identity used when reconciling duplicate instances
    fn key(&self) -> Option<ModelKey>;

    /// Read a named attribute, falling back to loaded relations
    fn attribute(&self, name: &str) -> Option<RelationValue>;

    /// Whether the attribute is present and not null
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).map_or(false, |value| !value.is_null())
    }

    /// All relation slots currently set on the model
    fn relations(&self) -> Vec<(String, RelationValue)>;

    /// A single relation slot
    fn relation(&self, name: &str) -> Option<RelationValue>;

    /// Whether the slot exists, even when it holds null
    fn has_relation(&self, name: &str) -> bool {
        self.relation(name).is_some()
    }

    /// Set a relation slot
    fn set_relation(&self, name: &str, value: RelationValue);

    /// Install a child-to-parent reference without loading anything
    fn set_inverse_relation(&self, name: &str, value: RelationValue) {
        self.set_relation(name, value);
    }

    /// Install the reference to the parent owning the enclosing collection
    fn set_collection_relation(&self, name: &str, value: RelationValue) {
        self.set_relation(name, value);
    }

    /// Models already hydrated under a relation
    fn collection_relations(&self, name: &str) -> Vec<ModelRef> {
        match self.relation(name) {
            Some(RelationValue::Collection(models)) => models.into_vec(),
            Some(value) => value.as_model().into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Whether two handles point at the same model instance
pub fn same_model(a: &ModelRef, b: &ModelRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Read an attribute as a key (foreign and local key columns)
pub fn attribute_key(model: &ModelRef, name: &str) -> Option<ModelKey> {
    match model.attribute(name)? {
        RelationValue::Scalar(value) => ModelKey::from_json(&value),
        value => value.as_model()?.key(),
    }
}
