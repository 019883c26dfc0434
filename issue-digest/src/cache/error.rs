//! Issue cache error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the issue cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to open the database file.
    #[error("Failed to open issue cache '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite error.
    #[error("Issue cache error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to encode a list column.
    #[error("Failed to encode {field} of issue {id}: {source}")]
    Encode {
        field: &'static str,
        id: u64,
        #[source]
        source: serde_json::Error,
    },

    /// A thread panicked while holding the connection.
    #[error("Issue cache connection lock poisoned")]
    Poisoned,
}
