use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerbook_accounting::FieldErrors;
use ledgerbook_store::StoreError;

/// Error body shape: `{ "error": <string | field-error tree> }`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

/// 400 with the structured field-error tree as the error payload.
pub fn validation_error(errors: &FieldErrors) -> axum::response::Response {
    tracing::debug!(
        messages = ?errors.flatten_messages(),
        "request rejected by validator"
    );
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "error": errors })),
    )
        .into_response()
}

/// 500 with a generic message; the underlying detail goes to the log only.
pub fn internal_error(err: StoreError, message: &'static str) -> axum::response::Response {
    tracing::error!(error = %err, "{message}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
