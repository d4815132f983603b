use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerbook_core::{AccountId, Entity, JournalEntryId};

use crate::field_errors::FieldErrors;

/// Tolerance for the debit/credit balance comparison.
///
/// Amounts are IEEE doubles, so the entry-wide sums are compared within a
/// fixed tolerance instead of exactly.
pub const BALANCE_TOLERANCE: f64 = 0.001;

/// One side of a journal entry.
///
/// Exactly one of `debit`/`credit` is nonzero; both are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_id: AccountId,
    pub debit: f64,
    pub credit: f64,
}

/// Journal entry record: a single balanced transaction.
///
/// Entries are immutable once persisted; corrections are made with reversal
/// entries, never by editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub date: NaiveDate,
    pub memo: Option<String>,
    pub lines: Vec<JournalLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for JournalEntry {
    type Id = JournalEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Amount as submitted: a JSON number, or a string that is parsed as one.
///
/// Anything unparseable (or a non-finite parse) coerces to zero. This is the
/// documented coercion rule for blank form fields, applied server-side as
/// well so the two sides agree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    pub fn to_f64(&self) -> f64 {
        match self {
            RawAmount::Number(n) => *n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
        }
    }
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Number(0.0)
    }
}

/// Raw journal line as submitted by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalLineInput {
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    #[serde(default)]
    pub debit: RawAmount,
    #[serde(default)]
    pub credit: RawAmount,
}

/// Raw journal entry as submitted by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalEntryInput {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub lines: Vec<JournalLineInput>,
}

/// Structurally valid journal line; the account reference is still unchecked.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalLineDraft {
    pub account_id: String,
    pub debit: f64,
    pub credit: f64,
}

/// Structurally valid journal entry payload.
///
/// Referential validation (do the accounts exist?) needs the store and is
/// the caller's next step.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntryDraft {
    pub date: NaiveDate,
    pub memo: Option<String>,
    pub lines: Vec<JournalLineDraft>,
}

/// Validate a raw journal entry.
///
/// Two tiers, both always evaluated so a caller can report every problem at
/// once: per-line checks (account reference present, sides non-negative,
/// exactly one side nonzero) and entry-level checks (line count, balance,
/// date). The balance sum runs over the raw coerced values even when some
/// lines are individually malformed.
pub fn validate_journal_entry(input: &JournalEntryInput) -> Result<JournalEntryDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let date = parse_entry_date(&input.date);
    if date.is_none() {
        errors.child("date").push("Invalid date");
    }

    let mut total_debit = 0.0_f64;
    let mut total_credit = 0.0_f64;
    let mut lines = Vec::with_capacity(input.lines.len());

    for (idx, line) in input.lines.iter().enumerate() {
        let debit = line.debit.to_f64();
        let credit = line.credit.to_f64();
        total_debit += debit;
        total_credit += credit;

        if line.account_id.is_empty() {
            errors
                .child("lines")
                .child(idx.to_string())
                .child("accountId")
                .push("Account is required");
        }
        if debit < 0.0 {
            errors
                .child("lines")
                .child(idx.to_string())
                .child("debit")
                .push("Debit must be a positive number");
        }
        if credit < 0.0 {
            errors
                .child("lines")
                .child(idx.to_string())
                .child("credit")
                .push("Credit must be a positive number");
        }
        // A line is either a debit line or a credit line, never both, never
        // neither. Reported on the debit field regardless of which side is
        // wrong.
        if (debit == 0.0) == (credit == 0.0) {
            errors
                .child("lines")
                .child(idx.to_string())
                .child("debit")
                .push("Either debit or credit must be specified, but not both");
        }

        lines.push(JournalLineDraft {
            account_id: line.account_id.clone(),
            debit,
            credit,
        });
    }

    if input.lines.len() < 2 {
        errors.child("lines").push("At least two lines are required");
    }

    let imbalance = (total_debit - total_credit).abs();
    if imbalance >= BALANCE_TOLERANCE {
        errors.child("lines").push(format!(
            "Total debit must equal total credit (off by {imbalance:.2})"
        ));
    }

    match (date, errors.is_empty()) {
        (Some(date), true) => Ok(JournalEntryDraft {
            date,
            memo: input.memo.clone(),
            lines,
        }),
        _ => Err(errors),
    }
}

/// Coerce the submitted date to a calendar value.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part taken).
fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}
