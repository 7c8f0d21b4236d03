pub mod migrate;
pub mod serve;

use anyhow::Context;
use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DocumentStore, MemoryDocumentStore, PgDocumentStore};

/// Open the configured store once; the handle is shared by every request
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let store = PgDocumentStore::connect(&config.database)
                .await
                .context("failed to connect to document store")?;
            store.migrate().await.context("failed to prepare collections")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}
