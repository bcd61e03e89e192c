//! Model Collection - Ordered result set with positional replacement

use std::fmt;
use std::ops::Index;

use super::core_trait::{ModelRef, RelatableModel};

/// Ordered collection of model handles returned by a relation query
#[derive(Clone, Default)]
pub struct ModelCollection {
    models: Vec<ModelRef>,
}

impl ModelCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// Get the model at a position
    pub fn get(&self, index: usize) -> Option<&ModelRef> {
        self.models.get(index)
    }

    /// Replace the model at a position, returning the one it displaced
    pub fn replace(&mut self, index: usize, model: ModelRef) -> Option<ModelRef> {
        self.models
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, model))
    }

    /// Add a model at the end
    pub fn push(&mut self, model: ModelRef) {
        self.models.push(model);
    }

    /// Get the count of models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if there are any models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate over the models
    pub fn iter(&self) -> std::slice::Iter<'_, ModelRef> {
        self.models.iter()
    }

    /// First model, if any
    pub fn first(&self) -> Option<&ModelRef> {
        self.models.first()
    }

    /// Take the underlying models
    pub fn into_vec(self) -> Vec<ModelRef> {
        self.models
    }
}

impl From<Vec<ModelRef>> for ModelCollection {
    fn from(models: Vec<ModelRef>) -> Self {
        Self { models }
    }
}

impl FromIterator<ModelRef> for ModelCollection {
    fn from_iter<I: IntoIterator<Item = ModelRef>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for ModelCollection {
    type Output = ModelRef;

    fn index(&self, index: usize) -> &Self::Output {
        &self.models[index]
    }
}

impl IntoIterator for ModelCollection {
    type Item = ModelRef;
    type IntoIter = std::vec::IntoIter<ModelRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModelCollection {
    type Item = &'a ModelRef;
    type IntoIter = std::slice::Iter<'a, ModelRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

impl fmt::Debug for ModelCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.models.iter().map(|model| (model.model_name(), model.key())))
            .finish()
    }
}
