//! In-memory store for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use ledgerbook_accounting::{Account, AccountDraft, JournalEntry};
use ledgerbook_core::{AccountId, JournalEntryId};

use crate::error::StoreError;
use crate::repository::{AccountStore, JournalEntryStore, NewJournalEntry};

/// In-memory account + journal storage.
///
/// Uniqueness and referential checks run under the same locks as the writes
/// they guard, so the check-then-act races of a naive implementation cannot
/// occur here. Lock order is always accounts before entries.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
    entries: RwLock<HashMap<JournalEntryId, JournalEntry>>,
}

type AccountMap = HashMap<AccountId, Account>;
type EntryMap = HashMap<JournalEntryId, JournalEntry>;

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts_read(&self) -> Result<RwLockReadGuard<'_, AccountMap>, StoreError> {
        self.accounts
            .read()
            .map_err(|_| StoreError::Backend("account map lock poisoned".to_string()))
    }

    fn accounts_write(&self) -> Result<RwLockWriteGuard<'_, AccountMap>, StoreError> {
        self.accounts
            .write()
            .map_err(|_| StoreError::Backend("account map lock poisoned".to_string()))
    }

    fn entries_read(&self) -> Result<RwLockReadGuard<'_, EntryMap>, StoreError> {
        self.entries
            .read()
            .map_err(|_| StoreError::Backend("entry map lock poisoned".to_string()))
    }

    fn entries_write(&self) -> Result<RwLockWriteGuard<'_, EntryMap>, StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::Backend("entry map lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        let mut accounts = self.accounts_write()?;
        if accounts.values().any(|a| a.name == draft.name) {
            return Err(StoreError::DuplicateName);
        }

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            name: draft.name,
            kind: draft.kind,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts_read()?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.accounts_read()?.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<AccountId>,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts_read()?
            .values()
            .find(|a| a.name == name && Some(a.id) != exclude)
            .cloned())
    }

    async fn update(&self, id: AccountId, changes: AccountDraft) -> Result<Account, StoreError> {
        let mut accounts = self.accounts_write()?;
        if accounts
            .values()
            .any(|a| a.name == changes.name && a.id != id)
        {
            return Err(StoreError::DuplicateName);
        }

        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.name = changes.name;
        account.kind = changes.kind;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete(&self, id: AccountId) -> Result<(), StoreError> {
        let mut accounts = self.accounts_write()?;
        if !accounts.contains_key(&id) {
            return Err(StoreError::NotFound);
        }

        let in_use = self
            .entries_read()?
            .values()
            .any(|entry| entry.lines.iter().any(|line| line.account_id == id));
        if in_use {
            return Err(StoreError::AccountInUse);
        }

        accounts.remove(&id);
        Ok(())
    }

    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts_read()?;
        Ok(ids.iter().filter_map(|id| accounts.get(id).cloned()).collect())
    }
}

#[async_trait]
impl JournalEntryStore for InMemoryStore {
    async fn create(&self, new: NewJournalEntry) -> Result<JournalEntry, StoreError> {
        // Hold the account read lock across the insert so a concurrent
        // account delete cannot slip between the check and the write.
        let accounts = self.accounts_read()?;
        if new
            .lines
            .iter()
            .any(|line| !accounts.contains_key(&line.account_id))
        {
            return Err(StoreError::UnknownAccount);
        }

        let now = Utc::now();
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            date: new.date,
            memo: new.memo,
            lines: new.lines,
            created_at: now,
            updated_at: now,
        };
        self.entries_write()?.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.entries_read()?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<JournalEntry>, StoreError> {
        let mut entries: Vec<JournalEntry> = self.entries_read()?.values().cloned().collect();
        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerbook_accounting::{AccountKind, JournalLine};

    // Both traits share method names (`create`, `get`, `list`), so the
    // tests go through trait objects like the API layer does.
    fn accounts(store: &InMemoryStore) -> &dyn AccountStore {
        store
    }

    fn journal(store: &InMemoryStore) -> &dyn JournalEntryStore {
        store
    }

    fn draft(name: &str, kind: AccountKind) -> AccountDraft {
        AccountDraft {
            name: name.to_string(),
            kind,
        }
    }

    fn balanced_entry(debit_account: AccountId, credit_account: AccountId) -> NewJournalEntry {
        NewJournalEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            memo: None,
            lines: vec![
                JournalLine {
                    account_id: debit_account,
                    debit: 100.0,
                    credit: 0.0,
                },
                JournalLine {
                    account_id: credit_account,
                    debit: 0.0,
                    credit: 100.0,
                },
            ],
        }
    }

    #[tokio::test]
    async fn create_and_get_account() {
        let store = InMemoryStore::new();
        let created = accounts(&store)
            .create(draft("Cash", AccountKind::Asset))
            .await
            .unwrap();
        let fetched = accounts(&store).get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_exact_match_only() {
        let store = InMemoryStore::new();
        let accounts = accounts(&store);
        accounts.create(draft("Cash", AccountKind::Asset)).await.unwrap();

        let err = accounts
            .create(draft("Cash", AccountKind::Expense))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName));

        // Case-sensitive: a differently-cased name is a different account.
        assert!(accounts.create(draft("cash", AccountKind::Asset)).await.is_ok());
    }

    #[tokio::test]
    async fn list_orders_accounts_by_name() {
        let store = InMemoryStore::new();
        let accounts = accounts(&store);
        accounts.create(draft("Rent", AccountKind::Expense)).await.unwrap();
        accounts.create(draft("Cash", AccountKind::Asset)).await.unwrap();
        accounts.create(draft("Equity", AccountKind::Equity)).await.unwrap();

        let names: Vec<String> = accounts
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Cash", "Equity", "Rent"]);
    }

    #[tokio::test]
    async fn update_excludes_self_from_duplicate_check() {
        let store = InMemoryStore::new();
        let accounts = accounts(&store);
        let cash = accounts.create(draft("Cash", AccountKind::Asset)).await.unwrap();
        accounts.create(draft("Rent", AccountKind::Expense)).await.unwrap();

        // Same name, same account: fine.
        let updated = accounts
            .update(cash.id, draft("Cash", AccountKind::Asset))
            .await
            .unwrap();
        assert_eq!(updated.name, "Cash");

        // Renaming onto another account's name: conflict.
        let err = accounts
            .update(cash.id, draft("Rent", AccountKind::Asset))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName));
    }

    #[tokio::test]
    async fn update_missing_account_is_not_found() {
        let store = InMemoryStore::new();
        let err = accounts(&store)
            .update(AccountId::new(), draft("Cash", AccountKind::Asset))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_blocked_while_entries_reference_the_account() {
        let store = InMemoryStore::new();
        let accounts = accounts(&store);
        let cash = accounts.create(draft("Cash", AccountKind::Asset)).await.unwrap();
        let rent = accounts.create(draft("Rent", AccountKind::Expense)).await.unwrap();
        journal(&store)
            .create(balanced_entry(rent.id, cash.id))
            .await
            .unwrap();

        let err = accounts.delete(cash.id).await.unwrap_err();
        assert!(matches!(err, StoreError::AccountInUse));

        // An unreferenced account deletes fine.
        let unused = accounts.create(draft("Misc", AccountKind::Expense)).await.unwrap();
        accounts.delete(unused.id).await.unwrap();
        assert!(accounts.get(unused.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entry_creation_rejects_unknown_accounts() {
        let store = InMemoryStore::new();
        let cash = accounts(&store)
            .create(draft("Cash", AccountKind::Asset))
            .await
            .unwrap();

        let err = journal(&store)
            .create(balanced_entry(cash.id, AccountId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAccount));

        // Nothing was persisted.
        assert!(journal(&store).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entries_list_newest_date_first() {
        let store = InMemoryStore::new();
        let accounts = accounts(&store);
        let cash = accounts.create(draft("Cash", AccountKind::Asset)).await.unwrap();
        let rent = accounts.create(draft("Rent", AccountKind::Expense)).await.unwrap();

        let mut old = balanced_entry(rent.id, cash.id);
        old.date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut new = balanced_entry(rent.id, cash.id);
        new.date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        journal(&store).create(old).await.unwrap();
        journal(&store).create(new).await.unwrap();

        let dates: Vec<NaiveDate> = journal(&store)
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(
            dates,
            [
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn find_many_returns_only_existing_accounts() {
        let store = InMemoryStore::new();
        let cash = accounts(&store)
            .create(draft("Cash", AccountKind::Asset))
            .await
            .unwrap();

        let found = accounts(&store)
            .find_many(&[cash.id, AccountId::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, cash.id);
    }
}
