use crate::validation::ValidationError;
use thiserror::Error;

/// Every failure the core can report. Validation failures are raised before
/// any write reaches the store.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("task store failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("task store schema could not be migrated: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `(id, title)` of every task the prefix matched.
    #[error("ID prefix matches {} tasks", .0.len())]
    AmbiguousId(Vec<(String, String)>),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),
}
