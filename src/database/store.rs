use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// A stored document: a JSON object whose `_id` field carries its [`RecordId`]
pub type Document = Map<String, Value>;

/// Field name under which documents expose their identifier
pub const ID_FIELD: &str = "_id";

/// Errors from a [`DocumentStore`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Field '{field}' is not numeric")]
    NotNumeric { field: String },

    #[error("Stored document is not an object")]
    CorruptDocument,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The record sets the API reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Jobs,
    AppliedJobs,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Jobs, Collection::AppliedJobs];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::AppliedJobs => "applied_jobs",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Store-assigned unique identifier of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Multi-document selection for [`DocumentStore::find`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<RecordId>,
}

impl UpdateAck {
    pub fn matched(count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count: count,
            modified_count: count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

/// Outcome of [`DocumentStore::insert_and_increment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyAck {
    pub inserted: InsertAck,
    pub counter: UpdateAck,
}

/// Opaque document collection abstraction shared by every request.
///
/// Implementations must be cheap to share behind an `Arc`; the handle is
/// created once at startup and injected through [`AppState`](crate::state::AppState).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, in insertion order
    async fn find(&self, collection: Collection, filter: RecordFilter) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Document>, StoreError>;

    /// Store `doc` under a freshly assigned id; any `_id` in `doc` is replaced
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertAck, StoreError>;

    async fn delete_by_id(&self, collection: Collection, id: RecordId) -> Result<DeleteAck, StoreError>;

    /// Replace the whole body of the document with `id` by `doc`, keeping its id
    async fn replace_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        doc: Document,
    ) -> Result<UpdateAck, StoreError>;

    /// Insert `doc` into `collection` and add one to `field` of `target` in
    /// `target_collection`, atomically. A missing target matches zero
    /// documents and is not an error; the insert still commits.
    async fn insert_and_increment(
        &self,
        collection: Collection,
        doc: Document,
        target_collection: Collection,
        target: RecordId,
        field: &str,
    ) -> Result<ApplyAck, StoreError>;

    /// Round-trip to the backend to prove connectivity
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Attach `id` to `doc` under [`ID_FIELD`], replacing any caller-supplied value.
pub fn with_id(id: RecordId, doc: Document) -> Document {
    let mut out = Map::with_capacity(doc.len() + 1);
    out.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    for (key, value) in doc {
        if key != ID_FIELD {
            out.insert(key, value);
        }
    }
    out
}

/// Add one to a numeric counter field; absent or null counts as zero.
pub fn increment_field(doc: &mut Document, field: &str) -> Result<(), StoreError> {
    let next = match doc.get(field) {
        None | Some(Value::Null) => Value::from(1),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::from(i + 1),
            (None, Some(f)) => Value::from(f + 1.0),
            _ => return Err(StoreError::NotNumeric { field: field.to_string() }),
        },
        Some(_) => return Err(StoreError::NotNumeric { field: field.to_string() }),
    };
    doc.insert(field.to_string(), next);
    Ok(())
}
