//! BelongsTo Relationship - Child model belongs to an owner model
//!
//! The foreign key lives on the model the relation is defined on, so eager
//! matching compares each model's foreign key against the owners' local key.

use crate::model::{attribute_key, ModelCollection, ModelRef, RelatableModel, RelationValue};

use super::sharing::RelationSharing;
use super::traits::{group_by_key, Relatable, RelationshipMeta};

/// BelongsTo relationship bound to a child model
#[derive(Debug, Clone)]
pub struct BelongsTo {
    meta: RelationshipMeta,
    sharing: RelationSharing,
}

impl BelongsTo {
    /// Create a new BelongsTo relationship
    pub fn new(child: ModelRef, name: &str, foreign_key: &str) -> Self {
        Self {
            meta: RelationshipMeta::new(name, foreign_key),
            sharing: RelationSharing::for_parent(child),
        }
    }

    /// Set the key on the owner model (defaults to "id")
    pub fn with_owner_key(mut self, owner_key: &str) -> Self {
        self.meta = self.meta.with_local_key(owner_key);
        self
    }

    /// Initialize the query result and store it on the child
    pub fn get_result(&self, result: Option<ModelRef>) -> Option<ModelRef> {
        let model = self.init_relations_on_model(result, None);

        if let Some(child) = self.parent() {
            child.set_relation(&self.meta.name, RelationValue::from(model.clone()));
        }

        model
    }

    /// Match eagerly loaded owners onto each model
    pub fn match_eager(&self, models: &[ModelRef], owners: ModelCollection) {
        let owner_key = &self.meta.local_key;
        let grouped = group_by_key(owners, |owner| attribute_key(owner, owner_key));

        for model in models {
            let owner = attribute_key(model, &self.meta.foreign_key)
                .and_then(|key| grouped.get(&key.canonical()))
                .and_then(|owners| owners.first().cloned());

            let owner = self.init_relations_on_model(owner, Some(model));
            model.set_relation(&self.meta.name, RelationValue::from(owner));
        }
    }
}

impl Relatable for BelongsTo {
    fn sharing(&self) -> &RelationSharing {
        &self.sharing
    }

    fn sharing_mut(&mut self) -> &mut RelationSharing {
        &mut self.sharing
    }
}
