use anyhow::Context;

use crate::config::{AppConfig, StoreBackend};
use crate::database::PgDocumentStore;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrate requires STORE_BACKEND=postgres");
    }

    let store = PgDocumentStore::connect(&config.database)
        .await
        .context("failed to connect to document store")?;
    store.migrate().await.context("migration failed")?;

    println!("Collections are ready");
    Ok(())
}
