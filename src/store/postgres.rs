use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::{Resource, Store, StoreError};

const BOOTSTRAP_SQL: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS resources (
        id     BIGSERIAL PRIMARY KEY,
        kind   TEXT  NOT NULL,
        fields JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS resources_kind_idx ON resources (kind)",
];

/// Postgres-backed store. Every resource kind shares one jsonb table; the
/// store stays schemaless so new kinds need no migration.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        for statement in BOOTSTRAP_SQL {
            sqlx::query(statement).execute(&pool).await?;
        }
        let store = Self { pool };
        store.seed_roles().await?;
        Ok(store)
    }

    /// Idempotent role seed matching what the application expects at
    /// registration time.
    async fn seed_roles(&self) -> Result<(), StoreError> {
        for title in ["basic", "admin"] {
            let exists = sqlx::query(
                "SELECT 1 FROM resources WHERE kind = 'role' AND fields->>'title' = $1",
            )
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
            if !exists {
                let mut fields = Map::new();
                fields.insert("title".to_string(), Value::from(title));
                self.save("role", fields).await?;
            }
        }
        Ok(())
    }

    fn row_to_resource(kind: &str, id: i64, fields: Value) -> Result<Resource, StoreError> {
        match fields {
            Value::Object(map) => Ok(Resource {
                id,
                kind: kind.to_string(),
                fields: map,
            }),
            other => Err(StoreError::Query(format!(
                "resource {id} holds non-object fields: {other}"
            ))),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get(&self, kind: &str, id: i64) -> Result<Option<Resource>, StoreError> {
        let row = sqlx::query("SELECT fields FROM resources WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let fields: Value = row.try_get("fields")?;
                Ok(Some(Self::row_to_resource(kind, id, fields)?))
            }
            None => Ok(None),
        }
    }

    async fn get_all(&self, kind: &str) -> Result<Vec<Resource>, StoreError> {
        let rows = sqlx::query("SELECT id, fields FROM resources WHERE kind = $1 ORDER BY id")
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                let fields: Value = row.try_get("fields")?;
                Self::row_to_resource(kind, id, fields)
            })
            .collect()
    }

    async fn save(&self, kind: &str, fields: Map<String, Value>) -> Result<i64, StoreError> {
        let row = sqlx::query("INSERT INTO resources (kind, fields) VALUES ($1, $2) RETURNING id")
            .bind(kind)
            .bind(Value::Object(fields))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                    StoreError::Conflict(db.message().to_string())
                }
                _ => StoreError::Sqlx(e),
            })?;
        Ok(row.try_get("id")?)
    }

    async fn update(
        &self,
        resource: &Resource,
        patch: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        for name in patch.keys() {
            if !resource.fields.contains_key(name) {
                return Err(StoreError::UnknownField(name.clone()));
            }
        }
        let mut fields = resource.fields.clone();
        for (name, value) in patch {
            fields.insert(name.clone(), value.clone());
        }
        let result = sqlx::query("UPDATE resources SET fields = $1 WHERE kind = $2 AND id = $3")
            .bind(Value::Object(fields))
            .bind(&resource.kind)
            .bind(resource.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Query(format!(
                "{} {} is gone",
                resource.kind, resource.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, kind: &str, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM resources WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
