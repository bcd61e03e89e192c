//! Sharing Configuration - Serializable sharing declarations
//!
//! Lets relation sharing be declared alongside other relationship metadata
//! (JSON model definitions, generated code) instead of in builder calls.
//!
//! ```json
//! {
//!   "relate": "owner",
//!   "share": ["name", { "parent": "email", "child": "contactEmail" }],
//!   "relate_within": "group"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RelatableError, RelatableResult};
use crate::model::ModelRef;
use crate::relationships::{RelationSharing, SharedAttribute};

/// Serializable form of a `RelationSharing` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Back-reference name for the parent
    pub relate: Option<String>,
    /// Parent attributes copied onto children
    pub share: Vec<SharedAttribute>,
    /// Back-reference name for the collection-owning parent
    pub relate_within: Option<String>,
    /// Parent relation used for identity reconciliation
    pub reconcile_with: Option<String>,
}

impl SharingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relate(mut self, relationship: impl Into<String>) -> Self {
        self.relate = Some(relationship.into());
        self
    }

    pub fn with_share<I>(mut self, relations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SharedAttribute>,
    {
        self.share = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_relate_within(mut self, relationship: impl Into<String>) -> Self {
        self.relate_within = Some(relationship.into());
        self
    }

    pub fn with_reconcile_with(mut self, relation: impl Into<String>) -> Self {
        self.reconcile_with = Some(relation.into());
        self
    }

    /// Parse a declaration from JSON
    pub fn from_json(json: &str) -> RelatableResult<Self> {
        let config: SharingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the declaration to JSON
    pub fn to_json(&self) -> RelatableResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate the declaration for consistency
    pub fn validate(&self) -> RelatableResult<()> {
        self.to_sharing().validate()
    }

    /// Build a validated declaration bound to a default parent
    pub fn into_sharing(self, parent: Option<ModelRef>) -> RelatableResult<RelationSharing> {
        let mut sharing = RelationSharing::try_from(self)?;
        sharing.set_default_parent(parent);
        Ok(sharing)
    }

    fn to_sharing(&self) -> RelationSharing {
        let mut sharing = RelationSharing::new();
        if let Some(relate) = &self.relate {
            sharing.relate(relate.clone());
        }
        if let Some(relate_within) = &self.relate_within {
            sharing.relate_within(relate_within.clone());
        }
        if let Some(reconcile_with) = &self.reconcile_with {
            sharing.reconcile_with(reconcile_with.clone());
        }
        sharing.share(self.share.iter().cloned());
        sharing
    }
}

impl TryFrom<SharingConfig> for RelationSharing {
    type Error = RelatableError;

    fn try_from(config: SharingConfig) -> RelatableResult<Self> {
        let sharing = config.to_sharing();
        sharing.validate()?;
        Ok(sharing)
    }
}
