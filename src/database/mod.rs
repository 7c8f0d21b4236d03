pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use repository::{AppliedJobRepository, JobRepository, Listing, Lookup};
pub use store::{Collection, Document, DocumentStore, RecordId, StoreError};
