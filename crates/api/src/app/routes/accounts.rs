use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ledgerbook_accounting::{AccountInput, validate_account};
use ledgerbook_core::AccountId;
use ledgerbook_store::{AccountStore as _, StoreError};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.accounts.list().await {
        Ok(accounts) => {
            let items = accounts.iter().map(dto::account_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!(items))).into_response()
        }
        Err(e) => errors::internal_error(e, "Failed to fetch accounts"),
    }
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AccountInput>,
) -> axum::response::Response {
    let draft = match validate_account(&body) {
        Ok(draft) => draft,
        Err(field_errors) => return errors::validation_error(&field_errors),
    };

    // Friendly pre-check; the store's unique constraint is authoritative.
    match services.accounts.find_by_name(&draft.name, None).await {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "Account with this name already exists",
            );
        }
        Ok(None) => {}
        Err(e) => return errors::internal_error(e, "Failed to create account"),
    }

    match services.accounts.create(draft).await {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response()
        }
        Err(StoreError::DuplicateName) => errors::json_error(
            StatusCode::CONFLICT,
            "Account with this name already exists",
        ),
        Err(e) => errors::internal_error(e, "Failed to create account"),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AccountId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "Account not found");
    };

    match services.accounts.get(id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "Account not found"),
        Err(e) => errors::internal_error(e, "Failed to fetch account"),
    }
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<AccountInput>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AccountId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "Account not found");
    };

    let draft = match validate_account(&body) {
        Ok(draft) => draft,
        Err(field_errors) => return errors::validation_error(&field_errors),
    };

    match services.accounts.get(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "Account not found"),
        Err(e) => return errors::internal_error(e, "Failed to update account"),
    }

    // Another account may already hold the new name; this one is excluded.
    match services.accounts.find_by_name(&draft.name, Some(id)).await {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "Another account with this name already exists",
            );
        }
        Ok(None) => {}
        Err(e) => return errors::internal_error(e, "Failed to update account"),
    }

    match services.accounts.update(id, draft).await {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(StoreError::NotFound) => errors::json_error(StatusCode::NOT_FOUND, "Account not found"),
        Err(StoreError::DuplicateName) => errors::json_error(
            StatusCode::CONFLICT,
            "Another account with this name already exists",
        ),
        Err(e) => errors::internal_error(e, "Failed to update account"),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AccountId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "Account not found");
    };

    match services.accounts.delete(id).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response(),
        Err(StoreError::NotFound) => errors::json_error(StatusCode::NOT_FOUND, "Account not found"),
        Err(StoreError::AccountInUse) => errors::json_error(
            StatusCode::BAD_REQUEST,
            "Cannot delete account that is used in journal entries",
        ),
        Err(e) => errors::internal_error(e, "Failed to delete account"),
    }
}
