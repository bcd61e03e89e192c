//! BelongsToMany Relationship - Many-to-many through a pivot record
//!
//! Each related model carries its junction row under the `pivot` relation.
//! The relation reconciles against its own name: models the parent already
//! holds under that relation are reused instead of the fresh query results,
//! keeping the fresh pivot when the reused instance has none.

use tracing::{debug, trace};

use crate::model::{attribute_key, ModelCollection, ModelRef, RelatableModel, RelationValue};

use super::sharing::{RelationSharing, PIVOT_RELATION};
use super::traits::{group_by_key, Relatable, RelationshipMeta};

/// BelongsToMany relationship bound to a parent model
#[derive(Debug, Clone)]
pub struct BelongsToMany {
    meta: RelationshipMeta,
    /// Pivot column pointing at the related model
    related_key: String,
    sharing: RelationSharing,
}

impl BelongsToMany {
    /// Create a new BelongsToMany relationship.
    ///
    /// `foreign_key` is the pivot column pointing at the parent,
    /// `related_key` the pivot column pointing at the related model.
    pub fn new(parent: ModelRef, name: &str, foreign_key: &str, related_key: &str) -> Self {
        let mut sharing = RelationSharing::for_parent(parent);
        sharing.reconcile_with(name);

        Self {
            meta: RelationshipMeta::new(name, foreign_key),
            related_key: related_key.to_string(),
            sharing,
        }
    }

    /// Set the local key on the parent
    pub fn with_local_key(mut self, local_key: &str) -> Self {
        self.meta = self.meta.with_local_key(local_key);
        self
    }

    /// Attach a junction record to a related model
    pub fn attach_pivot(model: &ModelRef, pivot: ModelRef) {
        model.set_relation(PIVOT_RELATION, RelationValue::Model(pivot));
    }

    /// Junction record attached to a related model
    pub fn pivot_of(model: &ModelRef) -> Option<ModelRef> {
        model
            .relation(PIVOT_RELATION)
            .and_then(|pivot| pivot.as_model())
    }

    /// Initialize query results and store them on the parent
    pub fn get_results(&self, results: ModelCollection) -> ModelCollection {
        let models = self.init_relations_on_collection(results, None);

        if let Some(parent) = self.parent() {
            parent.set_relation(&self.meta.name, RelationValue::Collection(models.clone()));
        }

        models
    }

    /// Whether the model's pivot points back at the model itself
    fn pivot_matches(&self, model: &ModelRef) -> bool {
        let pivot_key =
            Self::pivot_of(model).and_then(|pivot| attribute_key(&pivot, &self.related_key));

        match (pivot_key, model.key()) {
            (Some(pivot_key), Some(key)) => pivot_key.same_identity(&key),
            _ => false,
        }
    }

    /// Match eagerly loaded results to their parents through the pivot.
    ///
    /// Results whose pivot does not point at them through the related key
    /// are dropped.
    pub fn match_eager(&self, parents: &[ModelRef], results: ModelCollection) {
        let foreign_key = &self.meta.foreign_key;
        let results: ModelCollection = results
            .into_iter()
            .filter(|model| {
                let matches = self.pivot_matches(model);
                if !matches {
                    trace!(
                        "Skipping {} of '{}': pivot '{}' does not reference it",
                        model.model_name(),
                        self.meta.name,
                        self.related_key
                    );
                }
                matches
            })
            .collect();
        let mut grouped = group_by_key(results, |model| {
            Self::pivot_of(model).and_then(|pivot| attribute_key(&pivot, foreign_key))
        });

        debug!(
            "Matching {} pivot groups of '{}' onto {} parents",
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

impl Relatable for BelongsToMany {
    fn sharing(&self) -> &RelationSharing {
        &self.sharing
    }

    fn sharing_mut(&mut self) -> &mut RelationSharing {
        &mut self.sharing
    }
}
