//! HasOne Relationship - Parent model has exactly one related model

use crate::model::{attribute_key, ModelCollection, ModelRef, RelatableModel, RelationValue};

use super::sharing::RelationSharing;
use super::traits::{group_by_key, Relatable, RelationshipMeta};

/// HasOne relationship bound to a parent model
#[derive(Debug, Clone)]
pub struct HasOne {
    meta: RelationshipMeta,
    sharing: RelationSharing,
}

impl HasOne {
    /// Create a new HasOne relationship
    pub fn new(parent: ModelRef, name: &str, foreign_key: &str) -> Self {
        Self {
            meta: RelationshipMeta::new(name, foreign_key),
            sharing: RelationSharing::for_parent(parent),
        }
    }

    /// Set the local key on the parent
    pub fn with_local_key(mut self, local_key: &str) -> Self {
        self.meta = self.meta.with_local_key(local_key);
        self
    }

    /// Initialize the query result and store it on the parent
    pub fn get_result(&self, result: Option<ModelRef>) -> Option<ModelRef> {
        let model = self.init_relations_on_model(result, None);

        if let Some(parent) = self.parent() {
            parent.set_relation(&self.meta.name, RelationValue::from(model.clone()));
        }

        model
    }

    /// Match eagerly loaded results to their parents, first match wins
    pub fn match_eager(&self, parents: &[ModelRef], results: ModelCollection) {
        let foreign_key = &self.meta.foreign_key;
        let grouped = group_by_key(results, |model| attribute_key(model, foreign_key));

        for parent in parents {
            let related = attribute_key(parent, &self.meta.local_key)
                .and_then(|key| grouped.get(&key.canonical()))
                .and_then(|models| models.first().cloned());

            let related = self.init_relations_on_model(related, Some(parent));
            parent.set_relation(&self.meta.name, RelationValue::from(related));
        }
    }
}

impl Relatable for HasOne {
    fn sharing(&self) -> &RelationSharing {
        &self.sharing
    }

    fn sharing_mut(&mut self) -> &mut RelationSharing {
        &mut self.sharing
    }
}
