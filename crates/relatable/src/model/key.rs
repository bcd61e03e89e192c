//! Model Keys - Identity values used to reconcile duplicate model instances
//!
//! Supports integer, UUID, string and composite keys. Reconciliation compares
//! keys with [`ModelKey::same_identity`], which treats an integer key and its
//! decimal string form as the same row.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Key types a relatable model can expose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKey {
    /// Auto-incrementing integer key
    Integer(i64),
    /// UUID key
    Uuid(Uuid),
    /// Natural string key (slugs, codes)
    String(String),
    /// Composite key (multiple fields)
    Composite(BTreeMap<String, String>),
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKey::Integer(id) => write!(f, "{}", id),
            ModelKey::Uuid(id) => write!(f, "{}", id),
            ModelKey::String(id) => write!(f, "{}", id),
            ModelKey::Composite(fields) => {
                let pairs: Vec<String> =
                    fields.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{}", pairs.join(","))
            }
        }
    }
}

impl From<i64> for ModelKey {
    fn from(id: i64) -> Self {
        ModelKey::Integer(id)
    }
}

impl From<Uuid> for ModelKey {
    fn from(id: Uuid) -> Self {
        ModelKey::Uuid(id)
    }
}

impl From<&str> for ModelKey {
    fn from(id: &str) -> Self {
        ModelKey::String(id.to_string())
    }
}

impl From<String> for ModelKey {
    fn from(id: String) -> Self {
        ModelKey::String(id)
    }
}

impl ModelKey {
    /// Build a key from a JSON attribute value (foreign key columns)
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(ModelKey::Integer),
            serde_json::Value::String(s) => match Uuid::parse_str(s) {
                Ok(uuid) => Some(ModelKey::Uuid(uuid)),
                Err(_) => Some(ModelKey::String(s.clone())),
            },
            _ => None,
        }
    }

    /// Normalized form shared by all keys identifying the same row.
    ///
    /// Strings holding an integer or a UUID normalize to that integer or
    /// UUID, so `1`, `"1"` and `"01"` all produce `i:1`. Eager matching
    /// groups by this form, and [`ModelKey::same_identity`] compares it.
    pub fn canonical(&self) -> String {
        match self {
            ModelKey::Integer(id) => format!("i:{}", id),
            ModelKey::Uuid(id) => format!("u:{}", id),
            ModelKey::String(id) => {
                if let Ok(id) = id.trim().parse::<i64>() {
                    format!("i:{}", id)
                } else if let Ok(id) = Uuid::parse_str(id) {
                    format!("u:{}", id)
                } else {
                    format!("s:{}", id)
                }
            }
            ModelKey::Composite(fields) => {
                let fields = serde_json::to_string(fields).unwrap_or_else(|_| self.to_string());
                format!("c:{}", fields)
            }
        }
    }

    /// Whether two keys identify the same row.
    ///
    /// Integer keys match their decimal string form, since foreign key columns
    /// are frequently hydrated as text.
    pub fn same_identity(&self, other: &ModelKey) -> bool {
        self.canonical() == other.canonical()
    }
}
