use serde::Serialize;
use std::sync::Arc;

use crate::database::models::{job_fields, APPLICANT_COUNTER};
use crate::database::store::{
    Collection, DeleteAck, Document, DocumentStore, InsertAck, RecordFilter, RecordId, StoreError,
    UpdateAck,
};

/// How a list request narrows its collection.
///
/// An email filter wins over an id filter; with neither the whole
/// collection is returned. Empty parameters count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Email(String),
    Id(String),
    All,
}

impl Lookup {
    pub fn resolve(email: Option<String>, id: Option<String>) -> Self {
        match (
            email.filter(|e| !e.is_empty()),
            id.filter(|i| !i.is_empty()),
        ) {
            (Some(email), _) => Lookup::Email(email),
            (None, Some(id)) => Lookup::Id(id),
            (None, None) => Lookup::All,
        }
    }
}

/// Result of a list request: a sequence, or a single (possibly missing) record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Many(Vec<Document>),
    One(Option<Document>),
}

async fn list(
    store: &dyn DocumentStore,
    collection: Collection,
    lookup: Lookup,
) -> Result<Listing, StoreError> {
    match lookup {
        Lookup::Email(email) => Ok(Listing::Many(
            store.find(collection, RecordFilter::Email(email)).await?,
        )),
        Lookup::Id(raw) => {
            let id = RecordId::parse(&raw)?;
            Ok(Listing::One(store.find_by_id(collection, id).await?))
        }
        Lookup::All => Ok(Listing::Many(store.find(collection, RecordFilter::All).await?)),
    }
}

/// Read/write access to the `jobs` collection
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn DocumentStore>,
}

impl JobRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, lookup: Lookup) -> Result<Listing, StoreError> {
        list(self.store.as_ref(), Collection::Jobs, lookup).await
    }

    /// Store the body as posted, unknown fields included
    pub async fn create(&self, body: Document) -> Result<InsertAck, StoreError> {
        self.store.insert_one(Collection::Jobs, body).await
    }

    /// Deleting an id that does not exist reports zero deleted.
    ///
    /// An empty id names no record, so the store is not consulted.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, StoreError> {
        if id.is_empty() {
            return Ok(DeleteAck {
                acknowledged: true,
                deleted_count: 0,
            });
        }
        let id = RecordId::parse(id)?;
        self.store.delete_by_id(Collection::Jobs, id).await
    }

    /// Replace the record's body with the fixed field set taken from `body`.
    pub async fn update(&self, id: &str, body: Document) -> Result<UpdateAck, StoreError> {
        let id = RecordId::parse(id)?;
        self.store
            .replace_by_id(Collection::Jobs, id, job_fields(&body))
            .await
    }
}

/// Read/write access to the `applied_jobs` collection
#[derive(Clone)]
pub struct AppliedJobRepository {
    store: Arc<dyn DocumentStore>,
}

impl AppliedJobRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, lookup: Lookup) -> Result<Listing, StoreError> {
        list(self.store.as_ref(), Collection::AppliedJobs, lookup).await
    }

    /// Record an application to `job_id` and bump that job's applicant counter.
    ///
    /// Only the application's insert acknowledgment is returned; a job id
    /// that matches nothing leaves the counter untouched without failing.
    pub async fn apply(&self, job_id: &str, application: Document) -> Result<InsertAck, StoreError> {
        let job_id = RecordId::parse(job_id)?;
        let ack = self
            .store
            .insert_and_increment(
                Collection::AppliedJobs,
                application,
                Collection::Jobs,
                job_id,
                APPLICANT_COUNTER,
            )
            .await?;

        if ack.counter.matched_count == 0 {
            tracing::debug!("Application {} references unknown job {}", ack.inserted.inserted_id, job_id);
        }
        Ok(ack.inserted)
    }
}
