use thiserror::Error;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing document: {0}")]
    MissingDocument(String),

    #[error("Document already exists: {0}")]
    DuplicateDocument(String),

    #[error("Revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch { expected: i64, actual: i64 },

    #[error("Subscription closed")]
    SubscriptionClosed,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] koyomi_core::error::CoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
