//! Postgres-backed store implementation.
//!
//! ## Error mapping
//!
//! SQLx errors are mapped to `StoreError` by SQLSTATE:
//!
//! | PostgreSQL code | StoreError | Scenario |
//! |-----------------|------------|----------|
//! | `23505` (unique violation) | `DuplicateName` | Concurrent create/update with a taken name |
//! | `23503` (foreign key violation) | `UnknownAccount` / `AccountInUse` | Line references a missing account; delete of a referenced account |
//! | anything else | `Backend` | Connection, decode, or other database failure |
//!
//! The unique index on `accounts(name)` is the authoritative duplicate
//! signal; the application-level pre-check only exists for a friendlier
//! message.
//!
//! ## Thread safety
//!
//! Uses the SQLx connection pool (`Arc + Send + Sync`). Journal entry
//! creation runs in a transaction so readers never observe an entry with a
//! partial set of lines.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use ledgerbook_accounting::{Account, AccountDraft, AccountKind, JournalEntry, JournalLine};
use ledgerbook_core::{AccountId, JournalEntryId};

use crate::error::StoreError;
use crate::repository::{AccountStore, JournalEntryStore, NewJournalEntry};

/// Bootstrap DDL, applied idempotently at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS accounts_name_key ON accounts (name)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS journal_entries (
        id UUID PRIMARY KEY,
        entry_date DATE NOT NULL,
        memo TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS journal_lines (
        id UUID PRIMARY KEY,
        entry_id UUID NOT NULL REFERENCES journal_entries (id) ON DELETE CASCADE,
        account_id UUID NOT NULL REFERENCES accounts (id),
        line_no INT NOT NULL,
        debit DOUBLE PRECISION NOT NULL,
        credit DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS journal_lines_entry_idx ON journal_lines (entry_id, line_no)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS journal_lines_account_idx ON journal_lines (account_id)
    "#,
];

/// Postgres-backed account + journal storage.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to the database behind `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bootstrap DDL. Idempotent.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("run_migrations", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn create(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, name, kind)
            VALUES ($1, $2, $3)
            RETURNING id, name, kind, created_at, updated_at
            "#,
        )
        .bind(AccountId::new().as_uuid())
        .bind(&draft.name)
        .bind(draft.kind.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        account_from_row(&row)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, kind, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, kind, created_at, updated_at
            FROM accounts
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_accounts", e))?;

        rows.iter().map(account_from_row).collect()
    }

    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<AccountId>,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, kind, created_at, updated_at
            FROM accounts
            WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(name)
        .bind(exclude.map(|id| *id.as_uuid()))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account_by_name", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip(self, changes), fields(account_id = %id), err)]
    async fn update(&self, id: AccountId, changes: AccountDraft) -> Result<Account, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2, kind = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, kind, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&changes.name)
        .bind(changes.kind.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn delete(&self, id: AccountId) -> Result<(), StoreError> {
        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM journal_lines WHERE account_id = $1)
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("check_account_in_use", e))?;

        if in_use {
            return Err(StoreError::AccountInUse);
        }

        let deleted = sqlx::query(
            r#"
            DELETE FROM accounts WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| match error_code(&e).as_deref() {
            // A line referencing this account landed between the pre-check
            // and the delete; the FK keeps the ledger consistent.
            Some("23503") => StoreError::AccountInUse,
            _ => map_sqlx_error("delete_account", e),
        })?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_many(&self, ids: &[AccountId]) -> Result<Vec<Account>, StoreError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, name, kind, created_at, updated_at
            FROM accounts
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_accounts", e))?;

        rows.iter().map(account_from_row).collect()
    }
}

#[async_trait]
impl JournalEntryStore for PostgresStore {
    #[instrument(skip(self, new), fields(line_count = new.lines.len()), err)]
    async fn create(&self, new: NewJournalEntry) -> Result<JournalEntry, StoreError> {
        let entry_id = JournalEntryId::new();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_journal_entry", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO journal_entries (id, entry_date, memo)
            VALUES ($1, $2, $3)
            RETURNING id, entry_date, memo, created_at, updated_at
            "#,
        )
        .bind(entry_id.as_uuid())
        .bind(new.date)
        .bind(&new.memo)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_journal_entry", e))?;

        for (line_no, line) in new.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO journal_lines (id, entry_id, account_id, line_no, debit, credit)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(entry_id.as_uuid())
            .bind(line.account_id.as_uuid())
            .bind(line_no as i32)
            .bind(line.debit)
            .bind(line.credit)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_journal_line", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_journal_entry", e))?;

        entry_from_row(&row, new.lines)
    }

    async fn get(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, entry_date, memo, created_at, updated_at
            FROM journal_entries
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_journal_entry", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            r#"
            SELECT account_id, debit, credit
            FROM journal_lines
            WHERE entry_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_journal_lines", e))?;

        let lines = line_rows
            .iter()
            .map(line_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Some(entry_from_row(&row, lines)).transpose()
    }

    async fn list(&self) -> Result<Vec<JournalEntry>, StoreError> {
        let entry_rows = sqlx::query(
            r#"
            SELECT id, entry_date, memo, created_at, updated_at
            FROM journal_entries
            ORDER BY entry_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_journal_entries", e))?;

        let line_rows = sqlx::query(
            r#"
            SELECT entry_id, account_id, debit, credit
            FROM journal_lines
            ORDER BY entry_id, line_no ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_journal_lines", e))?;

        let mut lines_by_entry: HashMap<Uuid, Vec<JournalLine>> = HashMap::new();
        for row in &line_rows {
            let entry_id: Uuid = row.try_get("entry_id").map_err(row_error)?;
            lines_by_entry
                .entry(entry_id)
                .or_default()
                .push(line_from_row(row)?);
        }

        entry_rows
            .iter()
            .map(|row| {
                let id: Uuid = row.try_get("id").map_err(row_error)?;
                entry_from_row(row, lines_by_entry.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let id: Uuid = row.try_get("id").map_err(row_error)?;
    let name: String = row.try_get("name").map_err(row_error)?;
    let kind: String = row.try_get("kind").map_err(row_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(row_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(row_error)?;

    let kind = kind
        .parse::<AccountKind>()
        .map_err(|_| StoreError::Backend(format!("unknown account kind in store: {kind}")))?;

    Ok(Account {
        id: AccountId::from_uuid(id),
        name,
        kind,
        created_at,
        updated_at,
    })
}

fn line_from_row(row: &PgRow) -> Result<JournalLine, StoreError> {
    let account_id: Uuid = row.try_get("account_id").map_err(row_error)?;
    let debit: f64 = row.try_get("debit").map_err(row_error)?;
    let credit: f64 = row.try_get("credit").map_err(row_error)?;

    Ok(JournalLine {
        account_id: AccountId::from_uuid(account_id),
        debit,
        credit,
    })
}

fn entry_from_row(row: &PgRow, lines: Vec<JournalLine>) -> Result<JournalEntry, StoreError> {
    let id: Uuid = row.try_get("id").map_err(row_error)?;
    let date: chrono::NaiveDate = row.try_get("entry_date").map_err(row_error)?;
    let memo: Option<String> = row.try_get("memo").map_err(row_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(row_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(row_error)?;

    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(id),
        date,
        memo,
        lines,
        created_at,
        updated_at,
    })
}

fn row_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row: {err}"))
}

fn error_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.to_string()),
        _ => None,
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match error_code(&err).as_deref() {
        Some("23505") => StoreError::DuplicateName,
        Some("23503") => StoreError::UnknownAccount,
        _ => StoreError::Backend(format!("database error in {operation}: {err}")),
    }
}
