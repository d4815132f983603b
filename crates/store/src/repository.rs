//! Repository traits for accounts and journal entries.

use async_trait::async_trait;
use chrono::NaiveDate;

use ledgerbook_accounting::{Account, AccountDraft, JournalEntry, JournalLine};
use ledgerbook_core::{AccountId, JournalEntryId};

use crate::error::StoreError;

/// Journal entry ready to persist: validated, coerced, account ids resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub date: NaiveDate,
    pub memo: Option<String>,
    pub lines: Vec<JournalLine>,
}

/// Chart-of-accounts persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account. The store's own uniqueness guarantee is the
    /// authoritative `DuplicateName` signal; callers may pre-check via
    /// [`find_by_name`](Self::find_by_name) for a friendlier message.
    async fn create(&self, draft: AccountDraft) -> Result<Account, StoreError>;

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// All accounts, ordered by name ascending (case-sensitive).
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// Exact-match name lookup, optionally excluding one account (update path).
    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<AccountId>,
    ) -> Result<Option<Account>, StoreError>;

    /// Replace name/kind of an existing account.
    async fn update(&self, id: AccountId, changes: AccountDraft) -> Result<Account, StoreError>;

    /// Delete an account; fails with `AccountInUse` while journal lines
    /// reference it.
    async fn delete(&self, id: AccountId) -> Result<(), StoreError>;

    /// Fetch the accounts for a set of distinct ids. Missing ids are simply
    /// absent from the result; callers compare lengths for referential checks.
    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, StoreError>;
}

/// Journal entry persistence. Entries are append-only: no update, no delete.
#[async_trait]
pub trait JournalEntryStore: Send + Sync {
    /// Persist an entry and all of its lines as one all-or-nothing unit.
    /// Readers never observe a partial entry.
    async fn create(&self, new: NewJournalEntry) -> Result<JournalEntry, StoreError>;

    async fn get(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, StoreError>;

    /// All entries with their lines, ordered by date descending (newest
    /// first, ties broken by creation time).
    async fn list(&self) -> Result<Vec<JournalEntry>, StoreError>;
}
