//! Relation Sharing - Propagating parent state onto related models
//!
//! A `RelationSharing` declaration describes what a relation hands down to
//! the models it loads:
//!
//! - the parent itself, under `relate(name)`
//! - selected parent attributes, under `share([...])`
//! - the parent owning the enclosing collection, under `relate_within(name)`
//!
//! When `reconcile_with(name)` is set, collection initialization also swaps
//! freshly queried models for instances the parent already holds under that
//! relation, so the same row is never represented twice in memory.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{RelatableError, RelatableResult};
use crate::model::{ModelCollection, ModelRef, RelatableModel, RelationValue};

/// Relation slot holding the junction record of a many-to-many load
pub const PIVOT_RELATION: &str = "pivot";

/// One entry of a `share` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedAttribute {
    /// Parent and child use the same name
    Same(String),
    /// Parent attribute exposed under a different child relation name
    Renamed { parent: String, child: String },
}

impl SharedAttribute {
    pub fn renamed(parent: impl Into<String>, child: impl Into<String>) -> Self {
        SharedAttribute::Renamed {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Attribute name read from the parent
    pub fn parent_name(&self) -> &str {
        match self {
            SharedAttribute::Same(name) => name,
            SharedAttribute::Renamed { parent, .. } => parent,
        }
    }

    /// Relation name written on the child
    pub fn child_name(&self) -> &str {
        match self {
            SharedAttribute::Same(name) => name,
            SharedAttribute::Renamed { child, .. } => child,
        }
    }
}

impl From<&str> for SharedAttribute {
    fn from(name: &str) -> Self {
        SharedAttribute::Same(name.to_string())
    }
}

impl From<String> for SharedAttribute {
    fn from(name: String) -> Self {
        SharedAttribute::Same(name)
    }
}

impl From<(&str, &str)> for SharedAttribute {
    fn from((parent, child): (&str, &str)) -> Self {
        SharedAttribute::renamed(parent, child)
    }
}

impl From<(String, String)> for SharedAttribute {
    fn from((parent, child): (String, String)) -> Self {
        SharedAttribute::Renamed { parent, child }
    }
}

/// Relations computed from a parent for one initialization call
#[derive(Debug, Clone, Default)]
pub struct SharedRelations {
    /// The resolved parent, if any
    pub parent: Option<ModelRef>,
    /// Relation name to value, in declaration order
    pub relations: Vec<(String, RelationValue)>,
}

impl SharedRelations {
    /// Look up a shared relation by child-side name
    pub fn get(&self, name: &str) -> Option<&RelationValue> {
        self.relations
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    // Later entries overwrite earlier ones but keep their position.
    fn insert(&mut self, name: &str, value: RelationValue) {
        match self.relations.iter_mut().find(|(candidate, _)| candidate == name) {
            Some(slot) => slot.1 = value,
            None => self.relations.push((name.to_string(), value)),
        }
    }
}

/// Sharing declaration held by a relation
#[derive(Debug, Clone, Default)]
pub struct RelationSharing {
    relation_to_parent: Option<String>,
    relations_to_share: Vec<SharedAttribute>,
    relation_via_collection: Option<String>,
    relation_name: Option<String>,
    default_parent: Option<ModelRef>,
}

impl RelationSharing {
    /// Create an empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a declaration that falls back to `parent` when none is passed
    pub fn for_parent(parent: ModelRef) -> Self {
        Self {
            default_parent: Some(parent),
            ..Self::default()
        }
    }

    /// Expose the parent on each child under `relationship`
    pub fn relate(&mut self, relationship: impl Into<String>) -> &mut Self {
        self.relation_to_parent = Some(relationship.into());
        self
    }

    /// Expose the collection-owning parent on each child under `relationship`
    pub fn relate_within(&mut self, relationship: impl Into<String>) -> &mut Self {
        self.relation_via_collection = Some(relationship.into());
        self
    }

    /// Copy parent attributes onto each child; replaces any earlier list
    pub fn share<I>(&mut self, relations: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<SharedAttribute>,
    {
        self.relations_to_share = relations.into_iter().map(Into::into).collect();
        self
    }

    /// Reconcile collections against the parent's loaded `relation`
    pub fn reconcile_with(&mut self, relation: impl Into<String>) -> &mut Self {
        self.relation_name = Some(relation.into());
        self
    }

    /// Replace the fallback parent
    pub fn set_default_parent(&mut self, parent: Option<ModelRef>) -> &mut Self {
        self.default_parent = parent;
        self
    }

    pub fn relation_to_parent(&self) -> Option<&str> {
        non_empty(&self.relation_to_parent)
    }

    pub fn relations_to_share(&self) -> &[SharedAttribute] {
        &self.relations_to_share
    }

    pub fn relation_via_collection(&self) -> Option<&str> {
        non_empty(&self.relation_via_collection)
    }

    pub fn relation_name(&self) -> Option<&str> {
        non_empty(&self.relation_name)
    }

    pub fn default_parent(&self) -> Option<&ModelRef> {
        self.default_parent.as_ref()
    }

    /// Check the declaration for names that can never take effect or collide
    pub fn validate(&self) -> RelatableResult<()> {
        let named = [
            ("relate", &self.relation_to_parent),
            ("relate_within", &self.relation_via_collection),
            ("reconcile_with", &self.relation_name),
        ];
        for (setting, name) in named {
            if matches!(name, Some(name) if name.is_empty()) {
                return Err(RelatableError::EmptyRelationName(setting));
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for attribute in &self.relations_to_share {
            if attribute.parent_name().is_empty() || attribute.child_name().is_empty() {
                return Err(RelatableError::EmptyRelationName("share"));
            }
            let child = attribute.child_name();
            if self.relation_to_parent.as_deref() == Some(child) {
                return Err(RelatableError::ParentRelationCollision(child.to_string()));
            }
            if seen.contains(&child) {
                return Err(RelatableError::DuplicateSharedRelation(child.to_string()));
            }
            seen.push(child);
        }

        Ok(())
    }

    /// Compute the relations to hand down from `parent`.
    ///
    /// Falls back to the default parent. The back-reference is held weakly;
    /// a missing parent still yields it (as null) but no shared attributes.
    pub fn resolve_shared(&self, parent: Option<&ModelRef>) -> SharedRelations {
        let parent = parent.or(self.default_parent.as_ref()).cloned();
        let mut shared = SharedRelations {
            parent: None,
            relations: Vec::new(),
        };

        if let Some(name) = self.relation_to_parent() {
            shared.insert(name, RelationValue::parent_of(parent.as_ref()));
        }

        if let Some(parent) = &parent {
            for attribute in &self.relations_to_share {
                match parent.attribute(attribute.parent_name()) {
                    Some(value) if !value.is_null() => {
                        shared.insert(attribute.child_name(), value);
                    }
                    _ => trace!(
                        "Skipping shared relation '{}': '{}' not set on {}",
                        attribute.child_name(),
                        attribute.parent_name(),
                        parent.model_name()
                    ),
                }
            }
        }

        shared.parent = parent;
        shared
    }

    /// Write shared relations onto a single model
    pub fn apply_shared(&self, model: &ModelRef, shared: &SharedRelations) -> ModelRef {
        for (relation, value) in &shared.relations {
            model.set_inverse_relation(relation, value.clone());
        }

        if let Some(relation) = self.relation_via_collection() {
            let parent = RelationValue::parent_of(shared.parent.as_ref());
            model.set_collection_relation(relation, parent);
        }

        model.clone()
    }

    /// Initialize shared relations on a single model
    pub fn init_relations_on_model(
        &self,
        model: Option<ModelRef>,
        parent: Option<&ModelRef>,
    ) -> Option<ModelRef> {
        let model = model?;
        let shared = self.resolve_shared(parent);
        Some(self.apply_shared(&model, &shared))
    }

    /// Initialize shared relations on every model of a result set.
    ///
    /// Models the parent already holds under the reconciliation relation
    /// replace their freshly queried duplicates in place.
    pub fn init_relations_on_collection(
        &self,
        mut models: ModelCollection,
        parent: Option<&ModelRef>,
    ) -> ModelCollection {
        if models.is_empty() {
            return models;
        }

        let shared = self.resolve_shared(parent);

        if let Some(relation_name) = self.relation_name() {
            match &shared.parent {
                Some(parent) => {
                    let replaced = reconcile(&mut models, parent, relation_name);
                    debug!(
                        "Reconciled {} of {} models against {}.{}",
                        replaced,
                        models.len(),
                        parent.model_name(),
                        relation_name
                    );
                }
                None => warn!(
                    "Cannot reconcile '{}' without a parent model",
                    relation_name
                ),
            }
        }

        for model in &models {
            self.apply_shared(model, &shared);
        }

        debug!(
            "Shared {} relations onto {} models",
            shared.len(),
            models.len()
        );

        models
    }
}

/// Replace models matching an instance the parent already holds.
///
/// Every position is checked for every loaded model, so a key appearing more
/// than once in either set is replaced more than once.
fn reconcile(models: &mut ModelCollection, parent: &ModelRef, relation_name: &str) -> usize {
    let mut replaced = 0;

    for related in parent.collection_relations(relation_name) {
        let Some(related_key) = related.key() else {
            continue;
        };

        for index in 0..models.len() {
            let matches = models
                .get(index)
                .and_then(|model| model.key())
                .map_or(false, |key| key.same_identity(&related_key));
            if !matches {
                continue;
            }

            if let Some(previous) = models.replace(index, related.clone()) {
                if !related.has_relation(PIVOT_RELATION) {
                    if let Some(pivot) = previous.relation(PIVOT_RELATION) {
                        related.set_relation(PIVOT_RELATION, pivot);
                    }
                }
            }

            trace!(
                "Replaced {}#{} at position {} with loaded instance",
                related.model_name(),
                related_key,
                index
            );
            replaced += 1;
        }
    }

    replaced
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|name| !name.is_empty())
}
