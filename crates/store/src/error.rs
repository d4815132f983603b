//! Store error model.

use thiserror::Error;

/// Failures surfaced by the persistence boundary.
///
/// The first four are deterministic outcomes callers branch on; `Backend`
/// covers unexpected infrastructure failures and is never shown to API
/// callers beyond a generic message.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("not found")]
    NotFound,

    /// Another account already holds this name (case-sensitive exact match).
    #[error("an account with this name already exists")]
    DuplicateName,

    /// The account is referenced by journal entry lines and cannot be deleted.
    #[error("account is referenced by journal entries")]
    AccountInUse,

    /// A journal line references an account that does not exist.
    #[error("one or more referenced accounts do not exist")]
    UnknownAccount,

    /// Unexpected storage failure (connection, decode, lock).
    #[error("storage backend error: {0}")]
    Backend(String),
}
