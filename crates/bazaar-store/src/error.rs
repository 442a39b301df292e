use bazaar_shared::ConversationId;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No conversation with this id exists.
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    /// A conversation with this id already exists.
    #[error("Conversation already exists: {0}")]
    Duplicate(ConversationId),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Product snapshot (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UUID parsing error.
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Chrono parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),

    /// A stored row holds a value the models cannot represent.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A stored role column holds an unknown value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
