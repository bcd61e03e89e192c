//! Relation Values - What a relation slot can hold

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

use super::collection::ModelCollection;
use super::core_trait::{same_model, ModelRef, RelatableModel};

/// Value stored in a relation slot or read from a model attribute
#[derive(Clone)]
pub enum RelationValue {
    /// A single related model
    Model(ModelRef),
    /// Back-reference to the parent a child was loaded through.
    ///
    /// Held weakly so a parent holding its children never forms a cycle with
    /// the children pointing back at it.
    Parent(Weak<dyn RelatableModel>),
    /// A collection of related models
    Collection(ModelCollection),
    /// A plain attribute value
    Scalar(Value),
    /// An explicitly empty slot
    Null,
}

impl RelationValue {
    /// Weak back-reference to `parent`, or null when there is none
    pub fn parent_of(parent: Option<&ModelRef>) -> Self {
        parent.map_or(RelationValue::Null, |parent| {
            RelationValue::Parent(Arc::downgrade(parent))
        })
    }

    /// Null slots, JSON nulls and dropped parents all count as unset
    pub fn is_null(&self) -> bool {
        match self {
            RelationValue::Null | RelationValue::Scalar(Value::Null) => true,
            RelationValue::Parent(parent) => parent.strong_count() == 0,
            _ => false,
        }
    }

    /// The related model, upgrading a parent back-reference while it is alive
    pub fn as_model(&self) -> Option<ModelRef> {
        match self {
            RelationValue::Model(model) => Some(model.clone()),
            RelationValue::Parent(parent) => parent.upgrade(),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&ModelCollection> {
        match self {
            RelationValue::Collection(models) => Some(models),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            RelationValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Identity comparison: models by instance, scalars by value
    pub fn same_as(&self, other: &RelationValue) -> bool {
        match (self, other) {
            (
                RelationValue::Model(_) | RelationValue::Parent(_),
                RelationValue::Model(_) | RelationValue::Parent(_),
            ) => match (self.as_model(), other.as_model()) {
                (Some(a), Some(b)) => same_model(&a, &b),
                (None, None) => true,
                _ => false,
            },
            (RelationValue::Collection(a), RelationValue::Collection(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| same_model(x, y))
            }
            (RelationValue::Scalar(a), RelationValue::Scalar(b)) => a == b,
            (RelationValue::Null, RelationValue::Null) => true,
            _ => false,
        }
    }
}

impl From<ModelRef> for RelationValue {
    fn from(model: ModelRef) -> Self {
        RelationValue::Model(model)
    }
}

impl From<Option<ModelRef>> for RelationValue {
    fn from(model: Option<ModelRef>) -> Self {
        model.map_or(RelationValue::Null, RelationValue::Model)
    }
}

impl From<ModelCollection> for RelationValue {
    fn from(models: ModelCollection) -> Self {
        RelationValue::Collection(models)
    }
}

impl From<Value> for RelationValue {
    fn from(value: Value) -> Self {
        RelationValue::Scalar(value)
    }
}

// Models reference each other in both directions, so only summarize them.
impl fmt::Debug for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationValue::Model(model) => write!(f, "Model({})", describe(model)),
            RelationValue::Parent(parent) => match parent.upgrade() {
                Some(model) => write!(f, "Parent({})", describe(&model)),
                None => write!(f, "Parent(dropped)"),
            },
            RelationValue::Collection(models) => {
                let items: Vec<String> = models.iter().map(describe).collect();
                write!(f, "Collection([{}])", items.join(", "))
            }
            RelationValue::Scalar(value) => write!(f, "Scalar({})", value),
            RelationValue::Null => write!(f, "Null"),
        }
    }
}

fn describe(model: &ModelRef) -> String {
    match model.key() {
        Some(key) => format!("{}#{}", model.model_name(), key),
        None => format!("{}#new", model.model_name()),
    }
}
