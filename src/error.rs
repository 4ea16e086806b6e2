/// Error taxonomy for buffer, framing and configuration operations
///
/// Writes and bulk copies never fail: they truncate silently. Errors are reserved
/// for checked reads past the readable limit and for misuse of the API.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("end of stream: need {needed} bytes, have {available}")]
    EndOfStream { needed: usize, available: usize },

    #[error("limit cannot be changed while the buffer is in read mode")]
    LimitInReadMode,

    #[error("limit {limit} exceeds capacity {capacity}")]
    LimitOutOfRange { limit: usize, capacity: usize },

    #[error("read position {position} is past write position {write_position}")]
    ReadPositionOutOfRange { position: usize, write_position: usize },

    #[error("range offset {offset} + length {length} exceeds slice length {len}")]
    InvalidRange { offset: usize, length: usize, len: usize },

    #[error("invalid integer width: {0} (expected 1..=8)")]
    InvalidWidth(usize),

    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("invalid frame length: declared {declared}, maximum {max}")]
    InvalidFrameLength { declared: usize, max: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type BufferResult<T> = Result<T, BufferError>;
