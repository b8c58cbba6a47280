use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An interleaved write moved the event on; the caller should reload
    /// and retry.
    #[error("Concurrent update detected: {0}")]
    ConcurrencyClobber(String),

    #[error(transparent)]
    StoreError(#[from] koyomi_store::error::StoreError),

    #[error(transparent)]
    SlotError(#[from] koyomi_slot::error::SlotError),

    #[error(transparent)]
    CoreError(#[from] koyomi_core::error::CoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
