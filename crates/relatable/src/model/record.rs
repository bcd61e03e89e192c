//! Attribute Map Model - A relatable model backed by explicit attribute and relation maps
//!
//! `Record` is the dynamic model used when rows are hydrated without a typed
//! struct. Both maps use `DashMap`, so relation slots can be written through a
//! shared `ModelRef` while other handles to the same instance exist.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use super::core_trait::{ModelRef, RelatableModel};
use super::key::ModelKey;
use super::value::RelationValue;

/// Dynamic model with named attributes and relation slots
#[derive(Debug)]
pub struct Record {
    model_name: String,
    key_name: String,
    attributes: DashMap<String, Value>,
    relations: DashMap<String, RelationValue>,
}

impl Record {
    /// Create an empty record for a model
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            key_name: "id".to_string(),
            attributes: DashMap::new(),
            relations: DashMap::new(),
        }
    }

    /// Use a different attribute as the key
    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    /// Set an attribute while building the record
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a relation while building the record
    pub fn with_relation(self, name: impl Into<String>, value: impl Into<RelationValue>) -> Self {
        self.relations.insert(name.into(), value.into());
        self
    }

    /// Build a record from a JSON object row
    pub fn from_json(model_name: impl Into<String>, row: &Value) -> Self {
        let record = Self::new(model_name);
        if let Value::Object(fields) = row {
            for (name, value) in fields {
                record.attributes.insert(name.clone(), value.clone());
            }
        }
        record
    }

    /// Wrap the record in a shared handle
    pub fn into_ref(self) -> ModelRef {
        Arc::new(self)
    }

    /// Name of the key attribute
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Set an attribute on a shared record
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Raw attribute value, ignoring relations
    pub fn raw_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).map(|value| value.clone())
    }

    /// Remove a single relation slot
    pub fn forget_relation(&self, name: &str) -> Option<RelationValue> {
        self.relations.remove(name).map(|(_, value)| value)
    }

    /// Drop every relation slot
    pub fn flush_relations(&self) {
        self.relations.clear();
    }
}

impl RelatableModel for Record {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn key(&self) -> Option<ModelKey> {
        self.attributes
            .get(&self.key_name)
            .and_then(|value| ModelKey::from_json(value.value()))
    }

    fn attribute(&self, name: &str) -> Option<RelationValue> {
        if let Some(value) = self.attributes.get(name) {
            return Some(RelationValue::Scalar(value.clone()));
        }
        self.relation(name)
    }

    fn relations(&self) -> Vec<(String, RelationValue)> {
        let mut relations: Vec<(String, RelationValue)> = self
            .relations
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        relations.sort_by(|a, b| a.0.cmp(&b.0));
        relations
    }

    fn relation(&self, name: &str) -> Option<RelationValue> {
        self.relations.get(name).map(|value| value.clone())
    }

    fn set_relation(&self, name: &str, value: RelationValue) {
        self.relations.insert(name.to_string(), value);
    }
}
