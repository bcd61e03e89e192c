//! HasMany Relationship - Parent model has many related models

use tracing::debug;

use crate::model::{attribute_key, ModelCollection, ModelRef, RelatableModel, RelationValue};

use super::sharing::RelationSharing;
use super::traits::{group_by_key, Relatable, RelationshipMeta};

/// HasMany relationship bound to a parent model
#[derive(Debug, Clone)]
pub struct HasMany {
    meta: RelationshipMeta,
    sharing: RelationSharing,
}

impl HasMany {
    /// Create a new HasMany relationship
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

    /// Initialize query results and store them on the parent
    pub fn get_results(&self, results: ModelCollection) -> ModelCollection {
        let models = self.init_relations_on_collection(results, None);

        if let Some(parent) = self.parent() {
            parent.set_relation(&self.meta.name, RelationValue::Collection(models.clone()));
        }

        models
    }

    /// Match eagerly loaded results to their parents
    pub fn match_eager(&self, parents: &[ModelRef], results: ModelCollection) {
        let foreign_key = &self.meta.foreign_key;
        let mut grouped = group_by_key(results, |model| attribute_key(model, foreign_key));

        debug!(
            "Matching {} groups of '{}' onto {} parents",
            grouped.len(),
            self.meta.name,
            parents.len()
        );

        for parent in parents {
            let models = attribute_key(parent, &self.meta.local_key)
                .and_then(|key| grouped.remove(&key.canonical()))
                .unwrap_or_default();

            let models = self.init_relations_on_collection(models, Some(parent));
            parent.set_relation(&self.meta.name, RelationValue::Collection(models));
        }
    }
}

impl Relatable for HasMany {
    fn sharing(&self) -> &RelationSharing {
        &self.sharing
    }

    fn sharing_mut(&mut self) -> &mut RelationSharing {
        &mut self.sharing
    }
}
