use axum::Router;

pub mod accounts;
pub mod journal_entries;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/journal-entries", journal_entries::router())
}
