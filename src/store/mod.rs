pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A persisted entity of some `kind`, reachable by its integer id. Fields
/// are an open JSON map; the store owns the storage, callers only borrow.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Resource {
    pub id: i64,
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Resource {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String view of a field, empty when absent or non-string.
    pub fn str_field(&self, name: &str) -> &str {
        self.fields.get(name).and_then(Value::as_str).unwrap_or("")
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    /// Serialize to a JSON object including the id.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::from(self.id));
        Value::Object(map)
    }

    /// Serialize with the named fields removed (e.g. password digests).
    pub fn to_value_without(&self, hidden: &[&str]) -> Value {
        let mut value = self.to_value();
        if let Value::Object(map) = &mut value {
            for name in hidden {
                map.remove(*name);
            }
        }
        value
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Patch named a field the resource does not carry.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// A uniqueness or integrity rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The persistence collaborator. Absence is an `Ok(None)` / empty vec, never
/// an error; `StoreError` is reserved for engine failures and rejected
/// writes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, kind: &str, id: i64) -> Result<Option<Resource>, StoreError>;

    async fn get_all(&self, kind: &str) -> Result<Vec<Resource>, StoreError>;

    /// Persist a new resource and return its id.
    async fn save(&self, kind: &str, fields: Map<String, Value>) -> Result<i64, StoreError>;

    /// Apply `patch` field-by-field. Every key must already exist on the
    /// resource; an unknown name rejects the whole patch with
    /// `StoreError::UnknownField` and writes nothing.
    async fn update(&self, resource: &Resource, patch: &Map<String, Value>)
        -> Result<(), StoreError>;

    async fn delete(&self, kind: &str, id: i64) -> Result<(), StoreError>;
}
