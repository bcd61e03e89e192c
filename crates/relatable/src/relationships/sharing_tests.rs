//! Tests for relation sharing and collection reconciliation

use super::*;
use crate::model::{same_model, ModelCollection, ModelKey, ModelRef, RelatableModel, Record, RelationValue};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn record(model: &str, id: i64) -> Record {
    Record::new(model).with_attribute("id", id)
}

fn item(id: i64) -> ModelRef {
    record("items", id).into_ref()
}

fn model_at(models: &ModelCollection, index: usize) -> &ModelRef {
    models.get(index).unwrap()
}

fn relation_model(model: &ModelRef, name: &str) -> ModelRef {
    model
        .relation(name)
        .and_then(|value| value.as_model())
        .unwrap()
}

// Records every attribute read so tests can assert the resolver never ran.
#[derive(Debug)]
struct CountingModel {
    inner: Record,
    attribute_reads: AtomicUsize,
}

impl CountingModel {
    fn new(inner: Record) -> Arc<Self> {
        Arc::new(Self {
            inner,
            attribute_reads: AtomicUsize::new(0),
        })
    }

    fn reads(&self) -> usize {
        self.attribute_reads.load(Ordering::SeqCst)
    }
}

impl RelatableModel for CountingModel {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn key(&self) -> Option<ModelKey> {
        self.inner.key()
    }

    fn attribute(&self, name: &str) -> Option<RelationValue> {
        self.attribute_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.attribute(name)
    }

    fn relations(&self) -> Vec<(String, RelationValue)> {
        self.inner.relations()
    }

    fn relation(&self, name: &str) -> Option<RelationValue> {
        self.inner.relation(name)
    }

    fn set_relation(&self, name: &str, value: RelationValue) {
        self.inner.set_relation(name, value);
    }
}

#[test]
fn test_resolve_shared_includes_parent_back_reference() {
    let parent = record("users", 1).into_ref();
    let mut sharing = RelationSharing::new();
    sharing.relate("owner");

    let shared = sharing.resolve_shared(Some(&parent));

    assert_eq!(shared.len(), 1);
    assert!(shared
        .get("owner")
        .unwrap()
        .same_as(&RelationValue::Model(parent.clone())));
    assert!(same_model(shared.parent.as_ref().unwrap(), &parent));
}

#[test]
fn test_resolve_shared_plain_and_renamed_attributes() {
    let parent = record("users", 1)
        .with_attribute("foo", 1)
        .with_attribute("bar", 2)
        .into_ref();
    let mut sharing = RelationSharing::new();
    sharing.share([SharedAttribute::from("foo"), SharedAttribute::renamed("bar", "baz")]);

    let shared = sharing.resolve_shared(Some(&parent));

    let names: Vec<&str> = shared.relations.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["foo", "baz"]);
    assert_eq!(shared.get("foo").unwrap().as_scalar(), Some(&json!(1)));
    assert_eq!(shared.get("baz").unwrap().as_scalar(), Some(&json!(2)));
}

#[test]
fn test_resolve_shared_skips_missing_and_null_attributes() {
    let parent = record("users", 1)
        .with_attribute("foo", 1)
        .with_attribute("nickname", serde_json::Value::Null)
        .into_ref();
    let mut sharing = RelationSharing::new();
    sharing.share([
        SharedAttribute::from("foo"),
        SharedAttribute::renamed("bar", "baz"),
        SharedAttribute::from("nickname"),
    ]);

    let shared = sharing.resolve_shared(Some(&parent));

    assert_eq!(shared.len(), 1);
    assert!(!shared.contains("baz"));
    assert!(!shared.contains("nickname"));
}

#[test]
fn test_resolve_shared_copies_loaded_relations() {
    let company = record("companies", 9).into_ref();
    let parent = record("users", 1)
        .with_relation("company", company.clone())
        .into_ref();
    let mut sharing = RelationSharing::new();
    sharing.share(["company"]);

    let shared = sharing.resolve_shared(Some(&parent));

    assert!(same_model(&shared.get("company").unwrap().as_model().unwrap(), &company));
}

#[test]
fn test_resolve_shared_falls_back_to_default_parent() {
    let default_parent = record("users", 1).with_attribute("name", "Acme").into_ref();
    let explicit = record("users", 2).with_attribute("name", "Globex").into_ref();

    let mut sharing = RelationSharing::for_parent(default_parent.clone());
    sharing.relate("owner").share(["name"]);

    let shared = sharing.resolve_shared(None);
    assert!(same_model(shared.parent.as_ref().unwrap(), &default_parent));
    assert_eq!(shared.get("name").unwrap().as_scalar(), Some(&json!("Acme")));

    let shared = sharing.resolve_shared(Some(&explicit));
    assert!(same_model(shared.parent.as_ref().unwrap(), &explicit));
    assert_eq!(shared.get("name").unwrap().as_scalar(), Some(&json!("Globex")));
}

#[test]
fn test_resolve_shared_without_parent() {
    let mut sharing = RelationSharing::new();
    sharing.relate("owner").share(["name"]);

    let shared = sharing.resolve_shared(None);

    assert!(shared.parent.is_none());
    assert_eq!(shared.len(), 1);
    assert!(shared.get("owner").unwrap().is_null());
}

#[test]
fn test_empty_names_are_treated_as_unset() {
    let parent = record("users", 1).into_ref();
    let mut sharing = RelationSharing::new();
    sharing.relate("").relate_within("").reconcile_with("");

    assert!(sharing.relation_to_parent().is_none());
    assert!(sharing.relation_via_collection().is_none());
    assert!(sharing.relation_name().is_none());

    let model = item(1);
    sharing.init_relations_on_model(Some(model.clone()), Some(&parent));
    assert!(model.relations().is_empty());
}

#[test]
fn test_later_share_entry_overwrites_earlier_in_place() {
    let parent = record("users", 1)
        .with_attribute("name", "Acme")
        .with_attribute("legal_name", "Acme Ltd")
        .into_ref();
    let mut sharing = RelationSharing::new();
    sharing.share([
        SharedAttribute::from("name"),
        SharedAttribute::from("id"),
        SharedAttribute::renamed("legal_name", "name"),
    ]);

    let shared = sharing.resolve_shared(Some(&parent));

    assert_eq!(shared.relations[0].0, "name");
    assert_eq!(shared.get("name").unwrap().as_scalar(), Some(&json!("Acme Ltd")));
    assert_eq!(shared.len(), 2);
}

#[test]
fn test_share_replaces_previous_list() {
    let mut sharing = RelationSharing::new();
    sharing.share(["a", "b"]).share(["c"]);

    assert_eq!(sharing.relations_to_share(), &[SharedAttribute::from("c")]);
}

#[test]
fn test_apply_shared_sets_collection_relation_alongside_parent_relation() {
    let parent = record("groups", 1).into_ref();
    let model = item(5);
    let mut sharing = RelationSharing::new();
    sharing.relate("owner").relate_within("group");

    let shared = sharing.resolve_shared(Some(&parent));
    let returned = sharing.apply_shared(&model, &shared);

    assert!(same_model(&returned, &model));
    assert!(same_model(&relation_model(&model, "owner"), &parent));
    assert!(same_model(&relation_model(&model, "group"), &parent));
}

#[test]
fn test_apply_shared_collection_relation_without_parent_is_null() {
    let model = item(5);
    let mut sharing = RelationSharing::new();
    sharing.relate_within("group");

    let shared = sharing.resolve_shared(None);
    sharing.apply_shared(&model, &shared);

    assert!(model.has_relation("group"));
    assert!(model.relation("group").unwrap().is_null());
}

#[test]
fn test_init_on_model_none_returns_none() {
    let parent = CountingModel::new(record("users", 1).with_attribute("name", "Acme"));
    let parent_ref: ModelRef = parent.clone();
    let mut sharing = RelationSharing::new();
    sharing.relate("owner").share(["name"]);

    assert!(sharing.init_relations_on_model(None, Some(&parent_ref)).is_none());
    assert_eq!(parent.reads(), 0);
}

#[test]
fn test_init_on_model_is_idempotent() {
    let parent = record("users", 1).with_attribute("name", "Acme").into_ref();
    let model = item(3);
    let mut sharing = RelationSharing::new();
    sharing.relate("owner").share(["name"]).relate_within("group");

    sharing.init_relations_on_model(Some(model.clone()), Some(&parent));
    let once = model.relations();
    sharing.init_relations_on_model(Some(model.clone()), Some(&parent));
    let twice = model.relations();

    assert_eq!(once.len(), twice.len());
    for ((name_a, value_a), (name_b, value_b)) in once.iter().zip(twice.iter()) {
        assert_eq!(name_a, name_b);
        assert!(value_a.same_as(value_b));
    }
}

#[test]
fn test_init_on_empty_collection_does_not_touch_parent() {
    let parent = CountingModel::new(record("users", 1).with_attribute("name", "Acme"));
    let parent_ref: ModelRef = parent.clone();
    let mut sharing = RelationSharing::new();
    sharing.relate("owner").share(["name"]).reconcile_with("items");

    let models = sharing.init_relations_on_collection(ModelCollection::new(), Some(&parent_ref));

    assert!(models.is_empty());
    assert_eq!(parent.reads(), 0);
}

#[test]
fn test_init_on_collection_resolves_parent_once() {
    let parent = CountingModel::new(record("users", 1).with_attribute("name", "Acme"));
    let parent_ref: ModelRef = parent.clone();
    let mut sharing = RelationSharing::new();
    sharing.share(["name"]);

    let models: ModelCollection = (1..=5).map(item).collect();
    let models = sharing.init_relations_on_collection(models, Some(&parent_ref));

    assert_eq!(parent.reads(), 1);
    for model in &models {
        assert_eq!(model.relation("name").unwrap().as_scalar(), Some(&json!("Acme")));
    }
}

#[test]
fn test_reconcile_keeps_loaded_pivot() {
    let pivot_x = record("item_user", 100).into_ref();
    let item_a = record("items", 1).with_relation(PIVOT_RELATION, pivot_x.clone()).into_ref();
    let item_b = item(1);
    let parent = record("users", 1)
        .with_relation("items", ModelCollection::from(vec![item_a.clone()]))
        .into_ref();

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items");
    let models = sharing.init_relations_on_collection(vec![item_b].into(), Some(&parent));

    assert_eq!(models.len(), 1);
    assert!(same_model(model_at(&models, 0), &item_a));
    assert!(same_model(&relation_model(&item_a, PIVOT_RELATION), &pivot_x));
}

#[test]
fn test_reconcile_copies_fresh_pivot_onto_loaded_instance() {
    let pivot_x = record("item_user", 100).into_ref();
    let item_a = item(1);
    let item_b = record("items", 1).with_relation(PIVOT_RELATION, pivot_x.clone()).into_ref();
    let parent = record("users", 1)
        .with_relation("items", ModelCollection::from(vec![item_a.clone()]))
        .into_ref();

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items");
    let models = sharing.init_relations_on_collection(vec![item_b].into(), Some(&parent));

    assert!(same_model(model_at(&models, 0), &item_a));
    assert!(same_model(&relation_model(&item_a, PIVOT_RELATION), &pivot_x));
}

#[test]
fn test_reconcile_never_overwrites_existing_pivot() {
    let loaded_pivot = record("item_user", 100).into_ref();
    let fresh_pivot = record("item_user", 200).into_ref();
    let item_a = record("items", 1).with_relation(PIVOT_RELATION, loaded_pivot.clone()).into_ref();
    let item_b = record("items", 1).with_relation(PIVOT_RELATION, fresh_pivot).into_ref();
    let parent = record("users", 1)
        .with_relation("items", ModelCollection::from(vec![item_a.clone()]))
        .into_ref();

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items");
    sharing.init_relations_on_collection(vec![item_b].into(), Some(&parent));

    assert!(same_model(&relation_model(&item_a, PIVOT_RELATION), &loaded_pivot));
}

#[test]
fn test_reconcile_replaces_every_matching_position() {
    let loaded = item(1);
    let parent = record("users", 1)
        .with_relation("items", ModelCollection::from(vec![loaded.clone()]))
        .into_ref();

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items").relate("owner");
    let models = sharing.init_relations_on_collection(vec![item(1), item(2), item(1)].into(), Some(&parent));

    assert!(same_model(model_at(&models, 0), &loaded));
    assert!(!same_model(model_at(&models, 1), &loaded));
    assert!(same_model(model_at(&models, 2), &loaded));
    for model in &models {
        assert!(same_model(&relation_model(model, "owner"), &parent));
    }
}

#[test]
fn test_reconcile_matches_loose_keys_and_skips_unkeyed() {
    let loaded = Record::new("items").with_attribute("id", "7").into_ref();
    let unkeyed_loaded = Record::new("items").into_ref();
    let parent = record("users", 1)
        .with_relation(
            "items",
            ModelCollection::from(vec![loaded.clone(), unkeyed_loaded.clone()]),
        )
        .into_ref();
    let unkeyed_fresh = Record::new("items").into_ref();

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items");
    let models = sharing.init_relations_on_collection(
        vec![item(7), unkeyed_fresh.clone()].into(),
        Some(&parent),
    );

    assert!(same_model(model_at(&models, 0), &loaded));
    assert!(same_model(model_at(&models, 1), &unkeyed_fresh));
}

#[test]
fn test_reconcile_without_loaded_relation_keeps_models() {
    let parent = record("users", 1).into_ref();
    let fresh = item(1);

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items");
    let models = sharing.init_relations_on_collection(vec![fresh.clone()].into(), Some(&parent));

    assert!(same_model(model_at(&models, 0), &fresh));
}

#[test]
fn test_reconcile_without_parent_keeps_models() {
    let fresh = item(1);

    let mut sharing = RelationSharing::new();
    sharing.reconcile_with("items").relate("owner");
    let models = sharing.init_relations_on_collection(vec![fresh.clone()].into(), None);

    assert!(same_model(model_at(&models, 0), &fresh));
    assert!(fresh.relation("owner").unwrap().is_null());
}

#[test]
fn test_relatable_defaults_use_bound_parent() {
    let parent = record("users", 1)
        .with_attribute("name", "Acme")
        .with_attribute("email", "a@b.com")
        .into_ref();
    let relation = HasMany::new(parent.clone(), "contacts", "user_id")
        .share([SharedAttribute::from("name"), ("email", "contactEmail").into()]);

    let child = item(2);
    relation.init_relations_on_model(Some(child.clone()), None);

    assert_eq!(child.relation("name").unwrap().as_scalar(), Some(&json!("Acme")));
    assert_eq!(
        child.relation("contactEmail").unwrap().as_scalar(),
        Some(&json!("a@b.com"))
    );
    assert!(relation.shared_relations(None).contains("contactEmail"));
}
