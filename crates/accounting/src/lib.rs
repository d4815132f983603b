//! Accounting domain (chart of accounts + double-entry journal).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.
//! The validators here decide whether an account definition or a proposed
//! journal entry is well-formed; uniqueness and referential checks need a
//! store and belong to the caller.

pub mod account;
pub mod entry;
pub mod field_errors;

pub use account::{Account, AccountDraft, AccountInput, AccountKind, validate_account};
pub use entry::{
    BALANCE_TOLERANCE, JournalEntry, JournalEntryDraft, JournalEntryInput, JournalLine,
    JournalLineDraft, JournalLineInput, RawAmount, validate_journal_entry,
};
pub use field_errors::FieldErrors;
