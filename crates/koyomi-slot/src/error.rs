use thiserror::Error;

/// Slot key encoding and decoding errors
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Minute offset {0} is outside the day range")]
    MinuteOutOfRange(u16),

    #[error("Minute offset {0} is not aligned to the 30-minute grid")]
    UnalignedMinute(u16),

    #[error(transparent)]
    CoreError(#[from] koyomi_core::error::CoreError),
}

pub type SlotResult<T> = std::result::Result<T, SlotError>;
