use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::store::{
    increment_field, with_id, ApplyAck, Collection, DeleteAck, Document, DocumentStore, InsertAck,
    RecordFilter, RecordId, StoreError, UpdateAck, ID_FIELD,
};

/// Document store over Postgres: one JSONB table per [`Collection`].
///
/// `seq` preserves insertion order, which is the natural order of `find`.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the shared pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(max_connections = config.max_connections, "Created document store pool");
        Ok(Self { pool })
    }

    /// Create collection tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let table = quote_identifier(collection.name());
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id UUID PRIMARY KEY,
                    seq BIGSERIAL NOT NULL,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} USING gin (doc jsonb_path_ops)",
                quote_identifier(&format!("{}_doc_idx", collection.name()))
            ))
            .execute(&self.pool)
            .await?;

            info!("Ensured collection table: {}", collection);
        }
        Ok(())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn into_document(id: Uuid, doc: Value) -> Result<Document, StoreError> {
    match doc {
        Value::Object(map) => Ok(with_id(RecordId::from(id), map)),
        _ => Err(StoreError::CorruptDocument),
    }
}

fn strip_id(mut doc: Document) -> Value {
    doc.remove(ID_FIELD);
    Value::Object(doc)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: Collection, filter: RecordFilter) -> Result<Vec<Document>, StoreError> {
        let table = quote_identifier(collection.name());
        let rows: Vec<(Uuid, Value)> = match filter {
            RecordFilter::All => {
                sqlx::query_as(&format!("SELECT id, doc FROM {table} ORDER BY seq"))
                    .fetch_all(&self.pool)
                    .await?
            }
            RecordFilter::Email(email) => {
                sqlx::query_as(&format!(
                    "SELECT id, doc FROM {table} WHERE doc @> $1 ORDER BY seq"
                ))
                .bind(json!({ "email": email }))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!("Fetched {} documents from {}", rows.len(), collection);
        rows.into_iter()
            .map(|(id, doc)| into_document(id, doc))
            .collect()
    }

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Document>, StoreError> {
        let table = quote_identifier(collection.name());
        let row: Option<(Uuid, Value)> =
            sqlx::query_as(&format!("SELECT id, doc FROM {table} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, doc)| into_document(id, doc)).transpose()
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertAck, StoreError> {
        let id = RecordId::new();
        sqlx::query(&format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        ))
        .bind(id.as_uuid())
        .bind(strip_id(doc))
        .execute(&self.pool)
        .await?;

        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn delete_by_id(&self, collection: Collection, id: RecordId) -> Result<DeleteAck, StoreError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1",
            quote_identifier(collection.name())
        ))
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn replace_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        doc: Document,
    ) -> Result<UpdateAck, StoreError> {
        let table = quote_identifier(collection.name());
        let replacement = strip_id(doc);
        let mut tx = self.pool.begin().await?;

        let current: Option<Value> =
            sqlx::query_scalar(&format!("SELECT doc FROM {table} WHERE id = $1 FOR UPDATE"))
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(current) = current else {
            return Ok(UpdateAck::matched(0));
        };

        let changed = current != replacement;
        if changed {
            sqlx::query(&format!("UPDATE {table} SET doc = $2 WHERE id = $1"))
                .bind(id.as_uuid())
                .bind(&replacement)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(UpdateAck {
            modified_count: changed as u64,
            ..UpdateAck::matched(1)
        })
    }

    async fn insert_and_increment(
        &self,
        collection: Collection,
        doc: Document,
        target_collection: Collection,
        target: RecordId,
        field: &str,
    ) -> Result<ApplyAck, StoreError> {
        let id = RecordId::new();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        ))
        .bind(id.as_uuid())
        .bind(strip_id(doc))
        .execute(&mut *tx)
        .await?;

        // Same counter rule as every backend: absent or null counts as zero,
        // any other non-number fails the apply and rolls back the insert
        let target_table = quote_identifier(target_collection.name());
        let current: Option<Value> =
            sqlx::query_scalar(&format!("SELECT doc FROM {target_table} WHERE id = $1 FOR UPDATE"))
                .bind(target.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let matched = match current {
            Some(Value::Object(mut job)) => {
                increment_field(&mut job, field)?;
                sqlx::query(&format!("UPDATE {target_table} SET doc = $2 WHERE id = $1"))
                    .bind(target.as_uuid())
                    .bind(Value::Object(job))
                    .execute(&mut *tx)
                    .await?;
                1
            }
            Some(_) => return Err(StoreError::CorruptDocument),
            None => 0,
        };

        tx.commit().await?;

        Ok(ApplyAck {
            inserted: InsertAck {
                acknowledged: true,
                inserted_id: id,
            },
            counter: UpdateAck::matched(matched),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
