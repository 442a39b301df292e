use bazaar_shared::ValidationError;
use bazaar_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InboxError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("No conversations selected")]
    EmptySelection,

    #[error("No conversation is open")]
    NoOpenConversation,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Conversation is blocked")]
    Blocked,

    #[error("Image encoding failed: {0}")]
    ImageEncoding(String),

    #[error("Image too large: {size} bytes (max {max})")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Image upload needs a running Tokio runtime")]
    NoRuntime,

    #[error("Conversation is no longer available")]
    StaleTarget,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, InboxError>;
