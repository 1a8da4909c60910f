//! Error types for the loot repository boundary.

use thiserror::Error;

/// Result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by a backing store while fetching or storing loot rows.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("query on {table} failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("write to {table} failed: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("backing store unavailable for {0}")]
    Unavailable(String),

    #[error("transaction error: {0}")]
    Transaction(#[from] rusqlite::Error),
}
