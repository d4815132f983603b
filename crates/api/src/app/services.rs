//! Persistence wiring for the HTTP layer.

use std::sync::Arc;

use ledgerbook_store::{AccountStore, InMemoryStore, JournalEntryStore, PostgresStore};

/// Shared handles to the persistence boundary.
///
/// Both handles usually point at the same store value; they are kept as
/// separate trait objects so handlers depend only on the capability they
/// use.
pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    pub journal: Arc<dyn JournalEntryStore>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            accounts: store.clone(),
            journal: store,
        }
    }

    pub fn with_postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self {
            accounts: store.clone(),
            journal: store,
        }
    }
}

/// Construct the services once at process start.
///
/// `DATABASE_URL` set: connect a Postgres pool and apply the bootstrap DDL.
/// The pool lives inside the returned value and is dropped with it at
/// shutdown; nothing is stashed in process-global state. Unset: in-memory
/// store (dev/test), with a warning since state will not survive a restart.
pub async fn build_services() -> anyhow::Result<AppServices> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresStore::connect(&url).await?;
            store.run_migrations().await?;
            tracing::info!("using postgres persistence");
            Ok(AppServices::with_postgres(store))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (state is not persisted)");
            Ok(AppServices::in_memory())
        }
    }
}
