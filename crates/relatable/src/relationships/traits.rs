//! Relationship Traits - Sharing behavior any relation kind can opt into

use std::collections::HashMap;

use crate::model::{ModelCollection, ModelKey, ModelRef};

use super::sharing::{RelationSharing, SharedAttribute, SharedRelations};

/// Relationship metadata
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelationshipMeta {
    /// Relation name on the parent
    pub name: String,
    pub foreign_key: String,
    pub local_key: String,
}

impl RelationshipMeta {
    pub(crate) fn new(name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreign_key: foreign_key.into(),
            local_key: "id".to_string(),
        }
    }

    /// Set the local key (key column on the owning side)
    pub(crate) fn with_local_key(mut self, local_key: impl Into<String>) -> Self {
        self.local_key = local_key.into();
        self
    }
}

/// Relation sharing as a mixin: implementors provide a `RelationSharing`
/// and get the fluent declaration methods and initializers for free.
pub trait Relatable {
    fn sharing(&self) -> &RelationSharing;

    fn sharing_mut(&mut self) -> &mut RelationSharing;

    /// Get the parent model instance, if the relation is bound to one
    fn parent(&self) -> Option<&ModelRef> {
        self.sharing().default_parent()
    }

    /// Define the relationship of child to parent
    fn relate(mut self, relationship: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.sharing_mut().relate(relationship);
        self
    }

    /// Define the relationship of child to the parent owning its collection
    fn relate_within(mut self, relationship: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.sharing_mut().relate_within(relationship);
        self
    }

    /// Associate attributes to copy from the parent
    fn share<I>(mut self, relations: I) -> Self
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<SharedAttribute>,
    {
        self.sharing_mut().share(relations);
        self
    }

    /// Reconcile loaded collections against a parent relation
    fn reconcile_with(mut self, relation: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.sharing_mut().reconcile_with(relation);
        self
    }

    /// Relations that would be shared from `parent`
    fn shared_relations(&self, parent: Option<&ModelRef>) -> SharedRelations {
        self.sharing().resolve_shared(parent)
    }

    /// Initialize the parent relationship on a single model
    fn init_relations_on_model(
        &self,
        model: Option<ModelRef>,
        parent: Option<&ModelRef>,
    ) -> Option<ModelRef> {
        self.sharing().init_relations_on_model(model, parent)
    }

    /// Initialize the parent relationship on a set of models
    fn init_relations_on_collection(
        &self,
        models: ModelCollection,
        parent: Option<&ModelRef>,
    ) -> ModelCollection {
        self.sharing().init_relations_on_collection(models, parent)
    }
}

/// Group models by a key they carry, keeping result order within each group.
///
/// Keys are grouped by [`ModelKey::canonical`] so loosely equal keys (`1`,
/// `"1"` and `"01"`) land together. Lookups must use the same form.
pub(crate) fn group_by_key<F>(models: ModelCollection, key_of: F) -> HashMap<String, ModelCollection>
where
    F: Fn(&ModelRef) -> Option<ModelKey>,
{
    let mut grouped: HashMap<String, ModelCollection> = HashMap::new();

    for model in models {
        if let Some(key) = key_of(&model) {
            grouped.entry(key.canonical()).or_default().push(model);
        }
    }

    grouped
}
