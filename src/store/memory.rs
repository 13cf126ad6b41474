use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Resource, Store, StoreError};

/// In-memory store used by the test suites and local development. Resources
/// live in a single map keyed by (kind, id), mirroring the jsonb layout of
/// the Postgres store.
pub struct MemoryStore {
    rows: RwLock<BTreeMap<(String, i64), Map<String, Value>>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Fresh store with the `basic` and `admin` roles seeded, as the
    /// bootstrap migration does for the Postgres store.
    pub async fn seeded() -> Self {
        let store = Self::new();
        for title in ["basic", "admin"] {
            let mut fields = Map::new();
            fields.insert("title".to_string(), Value::from(title));
            // save on a fresh store cannot fail
            let _ = store.save("role", fields).await;
        }
        store
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, kind: &str, id: i64) -> Result<Option<Resource>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(kind.to_string(), id)).map(|fields| Resource {
            id,
            kind: kind.to_string(),
            fields: fields.clone(),
        }))
    }

    async fn get_all(&self, kind: &str) -> Result<Vec<Resource>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|((_, id), fields)| Resource {
                id: *id,
                kind: kind.to_string(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn save(&self, kind: &str, fields: Map<String, Value>) -> Result<i64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.write().await;
        rows.insert((kind.to_string(), id), fields);
        Ok(id)
    }

    async fn update(
        &self,
        resource: &Resource,
        patch: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let key = (resource.kind.clone(), resource.id);
        let fields = rows
            .get_mut(&key)
            .ok_or_else(|| StoreError::Query(format!("{} {} is gone", resource.kind, resource.id)))?;
        for name in patch.keys() {
            if !fields.contains_key(name) {
                return Err(StoreError::UnknownField(name.clone()));
            }
        }
        for (name, value) in patch {
            fields.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete(&self, kind: &str, id: i64) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        rows.remove(&(kind.to_string(), id));
        Ok(())
    }
}
