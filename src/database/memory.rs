use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::store::{
    increment_field, with_id, ApplyAck, Collection, DeleteAck, Document, DocumentStore, InsertAck,
    RecordFilter, RecordId, StoreError, UpdateAck, ID_FIELD,
};

type Rows = Vec<(RecordId, Document)>;

/// In-process document store used for local development and tests.
///
/// Documents live in insertion order per collection. All mutations take a
/// single write lock, so the two writes of an apply are never observed apart.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Collection, Rows>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn insert_row(rows: &mut Rows, mut doc: Document) -> InsertAck {
        let id = RecordId::new();
        doc.remove(ID_FIELD);
        rows.push((id, doc));
        InsertAck {
            acknowledged: true,
            inserted_id: id,
        }
    }
}

fn matches(doc: &Document, filter: &RecordFilter) -> bool {
    match filter {
        RecordFilter::All => true,
        RecordFilter::Email(email) => {
            matches!(doc.get("email"), Some(Value::String(value)) if value == email)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: Collection, filter: RecordFilter) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let docs = guard
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, doc)| matches(doc, &filter))
                    .map(|(id, doc)| with_id(*id, doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|rows| {
            rows.iter()
                .find(|(row_id, _)| *row_id == id)
                .map(|(row_id, doc)| with_id(*row_id, doc.clone()))
        }))
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertAck, StoreError> {
        let mut guard = self.collections.write().await;
        Ok(Self::insert_row(guard.entry(collection).or_default(), doc))
    }

    async fn delete_by_id(&self, collection: Collection, id: RecordId) -> Result<DeleteAck, StoreError> {
        let mut guard = self.collections.write().await;
        let deleted_count = match guard.get_mut(&collection) {
            Some(rows) => match rows.iter().position(|(row_id, _)| *row_id == id) {
                Some(index) => {
                    rows.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn replace_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        mut doc: Document,
    ) -> Result<UpdateAck, StoreError> {
        doc.remove(ID_FIELD);
        let mut guard = self.collections.write().await;
        let row = guard
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|(row_id, _)| *row_id == id));

        let Some((_, stored)) = row else {
            return Ok(UpdateAck::matched(0));
        };
        let changed = *stored != doc;
        *stored = doc;

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
        let mut guard = self.collections.write().await;

        // Bump the counter on a scratch copy first so a failure leaves nothing written
        let mut bumped = None;
        if let Some(rows) = guard.get(&target_collection) {
            if let Some(index) = rows.iter().position(|(row_id, _)| *row_id == target) {
                let mut copy = rows[index].1.clone();
                increment_field(&mut copy, field)?;
                bumped = Some((index, copy));
            }
        }

        let inserted = Self::insert_row(guard.entry(collection).or_default(), doc);

        let counter = match bumped {
            Some((index, copy)) => {
                if let Some(rows) = guard.get_mut(&target_collection) {
                    rows[index].1 = copy;
                }
                UpdateAck::matched(1)
            }
            None => UpdateAck::matched(0),
        };

        Ok(ApplyAck { inserted, counter })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
