//! Persistence boundary for the ledger.
//!
//! The repository traits here are the only way the rest of the system
//! touches storage. Two implementations: an in-memory store for tests/dev
//! and a Postgres-backed store for real deployments. Both enforce the
//! store-level guarantees the validators cannot: name uniqueness, referential
//! integrity of journal lines, and atomic entry+lines creation.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{AccountStore, JournalEntryStore, NewJournalEntry};
