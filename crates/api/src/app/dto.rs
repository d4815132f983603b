//! Response JSON mapping helpers.
//!
//! Request payloads deserialize straight into the validator input types
//! (`AccountInput`, `JournalEntryInput`); this module only shapes what goes
//! back out. Wire field names are camelCase.

use std::collections::HashMap;

use ledgerbook_accounting::{Account, JournalEntry};
use ledgerbook_core::AccountId;

pub fn account_to_json(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id.to_string(),
        "name": account.name,
        "type": account.kind,
        "createdAt": account.created_at.to_rfc3339(),
        "updatedAt": account.updated_at.to_rfc3339(),
    })
}

/// Entry with its lines; each line embeds the referenced account record.
pub fn entry_to_json(
    entry: &JournalEntry,
    accounts: &HashMap<AccountId, Account>,
) -> serde_json::Value {
    serde_json::json!({
        "id": entry.id.to_string(),
        "date": entry.date.to_string(),
        "memo": entry.memo,
        "createdAt": entry.created_at.to_rfc3339(),
        "updatedAt": entry.updated_at.to_rfc3339(),
        "lines": entry.lines.iter().map(|line| serde_json::json!({
            "accountId": line.account_id.to_string(),
            "debit": line.debit,
            "credit": line.credit,
            "account": accounts.get(&line.account_id).map(account_to_json),
        })).collect::<Vec<_>>(),
    })
}
