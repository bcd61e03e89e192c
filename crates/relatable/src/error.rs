//! Error types for relationship sharing
//!
//! The sharing operations themselves never fail. Errors only surface while a
//! sharing declaration is being configured or loaded from serialized metadata.

/// Result type alias for relatable configuration
pub type RelatableResult<T> = Result<T, RelatableError>;

/// Error types for sharing declarations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelatableError {
    /// A relation name was configured as an empty string
    #[error("Relation name for '{0}' must not be empty")]
    EmptyRelationName(&'static str),

    /// Two shared attributes write to the same child relation
    #[error("Shared relation '{0}' is declared more than once")]
    DuplicateSharedRelation(String),

    /// A shared attribute collides with the parent back-reference
    #[error("Shared relation '{0}' collides with the parent relation")]
    ParentRelationCollision(String),

    /// Serialized declaration could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RelatableError {
    fn from(err: serde_json::Error) -> Self {
        RelatableError::Serialization(err.to_string())
    }
}
