use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{AppliedJobRepository, DocumentStore, JobRepository};

/// Shared handles every handler can reach.
///
/// The store is opened once at startup and injected here, so tests can
/// substitute an in-memory or instrumented implementation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenService, config: AppConfig) -> Self {
        Self {
            store,
            tokens,
            config: Arc::new(config),
        }
    }

    pub fn jobs(&self) -> JobRepository {
        JobRepository::new(self.store.clone())
    }

    pub fn applied_jobs(&self) -> AppliedJobRepository {
        AppliedJobRepository::new(self.store.clone())
    }
}
