use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerbook_core::{AccountId, DomainError, Entity};

use crate::field_errors::FieldErrors;

/// High-level account kind (determines normal balance side).
///
/// The JSON representation is exactly the PascalCase variant name; any other
/// string is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    pub const ALL: [AccountKind; 5] = [
        AccountKind::Asset,
        AccountKind::Liability,
        AccountKind::Equity,
        AccountKind::Revenue,
        AccountKind::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "Asset",
            AccountKind::Liability => "Liability",
            AccountKind::Equity => "Equity",
            AccountKind::Revenue => "Revenue",
            AccountKind::Expense => "Expense",
        }
    }
}

impl core::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = DomainError;

    /// Case-sensitive exact match against the five enumerated values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Asset" => Ok(AccountKind::Asset),
            "Liability" => Ok(AccountKind::Liability),
            "Equity" => Ok(AccountKind::Equity),
            "Revenue" => Ok(AccountKind::Revenue),
            "Expense" => Ok(AccountKind::Expense),
            _ => Err(DomainError::validation("Invalid account type")),
        }
    }
}

/// Account record as persisted in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw account fields as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Structurally valid account payload.
///
/// Not yet uniqueness-checked: the caller still has to look the name up in
/// the store before persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub kind: AccountKind,
}

/// Validate raw account fields.
///
/// Pure: collects every field problem instead of stopping at the first one.
pub fn validate_account(input: &AccountInput) -> Result<AccountDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    if input.name.is_empty() {
        errors.child("name").push("Account name is required");
    }

    let kind = match input.kind.parse::<AccountKind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            errors.child("type").push("Invalid account type");
            None
        }
    };

    match (kind, errors.is_empty()) {
        (Some(kind), true) => Ok(AccountDraft {
            name: input.name.clone(),
            kind,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, kind: &str) -> AccountInput {
        AccountInput {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn every_enumerated_kind_validates_with_nonempty_name() {
        for kind in AccountKind::ALL {
            let draft = validate_account(&input("Cash", kind.as_str())).unwrap();
            assert_eq!(draft.kind, kind);
            assert_eq!(draft.name, "Cash");
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let errors = validate_account(&input("Cash", "Cryptocurrency")).unwrap_err();
        assert_eq!(
            errors.get("type").unwrap().errors(),
            ["Invalid account type"]
        );
    }

    #[test]
    fn kind_match_is_case_sensitive() {
        assert!(validate_account(&input("Cash", "asset")).is_err());
        assert!(validate_account(&input("Cash", "ASSET")).is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let errors = validate_account(&input("", "Asset")).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap().errors(),
            ["Account name is required"]
        );
    }

    #[test]
    fn whitespace_only_name_is_accepted() {
        // Only the non-empty length check exists; no trimming.
        assert!(validate_account(&input("  ", "Asset")).is_ok());
    }

    #[test]
    fn all_field_problems_are_collected() {
        let errors = validate_account(&input("", "Banana")).unwrap_err();
        assert_eq!(errors.flatten_messages().len(), 2);
    }
}
