use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ledgerbook_accounting::{Account, JournalEntryInput, JournalLine, validate_journal_entry};
use ledgerbook_core::{AccountId, JournalEntryId};
use ledgerbook_store::{
    AccountStore as _, JournalEntryStore as _, NewJournalEntry, StoreError,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", get(get_entry))
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let entries = match services.journal.list().await {
        Ok(entries) => entries,
        Err(e) => return errors::internal_error(e, "Failed to fetch journal entries"),
    };

    let referenced: Vec<AccountId> = distinct_account_ids(entries.iter().flat_map(|e| &e.lines));
    let accounts = match services.accounts.find_many(&referenced).await {
        Ok(accounts) => by_id(accounts),
        Err(e) => return errors::internal_error(e, "Failed to fetch journal entries"),
    };

    let items = entries
        .iter()
        .map(|entry| dto::entry_to_json(entry, &accounts))
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!(items))).into_response()
}

pub async fn get_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<JournalEntryId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "Journal entry not found");
    };

    let entry = match services.journal.get(id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "Journal entry not found"),
        Err(e) => return errors::internal_error(e, "Failed to fetch journal entry"),
    };

    let referenced = distinct_account_ids(entry.lines.iter());
    match services.accounts.find_many(&referenced).await {
        Ok(accounts) => (
            StatusCode::OK,
            Json(dto::entry_to_json(&entry, &by_id(accounts))),
        )
            .into_response(),
        Err(e) => errors::internal_error(e, "Failed to fetch journal entry"),
    }
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<JournalEntryInput>,
) -> axum::response::Response {
    let draft = match validate_journal_entry(&body) {
        Ok(draft) => draft,
        Err(field_errors) => return errors::validation_error(&field_errors),
    };

    // Referential check: every distinct referenced account must exist. An
    // id that doesn't even parse cannot belong to an existing account.
    let mut lines = Vec::with_capacity(draft.lines.len());
    for line in &draft.lines {
        let Ok(account_id) = line.account_id.parse::<AccountId>() else {
            return errors::json_error(StatusCode::BAD_REQUEST, "One or more accounts do not exist");
        };
        lines.push(JournalLine {
            account_id,
            debit: line.debit,
            credit: line.credit,
        });
    }

    let referenced = distinct_account_ids(lines.iter());
    let accounts = match services.accounts.find_many(&referenced).await {
        Ok(accounts) => accounts,
        Err(e) => return errors::internal_error(e, "Failed to create journal entry"),
    };
    if accounts.len() != referenced.len() {
        return errors::json_error(StatusCode::BAD_REQUEST, "One or more accounts do not exist");
    }

    let new = NewJournalEntry {
        date: draft.date,
        memo: draft.memo,
        lines,
    };

    match services.journal.create(new).await {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(dto::entry_to_json(&entry, &by_id(accounts))),
        )
            .into_response(),
        Err(StoreError::UnknownAccount) => {
            errors::json_error(StatusCode::BAD_REQUEST, "One or more accounts do not exist")
        }
        Err(e) => errors::internal_error(e, "Failed to create journal entry"),
    }
}

fn distinct_account_ids<'a>(lines: impl Iterator<Item = &'a JournalLine>) -> Vec<AccountId> {
    let mut ids: Vec<AccountId> = lines.map(|line| line.account_id).collect();
    ids.sort();
    ids.dedup();
    ids
}

fn by_id(accounts: Vec<Account>) -> HashMap<AccountId, Account> {
    accounts.into_iter().map(|a| (a.id, a)).collect()
}
