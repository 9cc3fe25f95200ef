use thiserror::Error;

use super::codec::Mode;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // Invalid arguments
    #[error("invalid version range: min {min}, max {max}")]
    InvalidVersionRange { min: usize, max: usize },
    #[error("invalid error correction level")]
    InvalidECLevel,

    // Invalid characters
    #[error("invalid character {ch:?} for {mode} mode")]
    InvalidChar { ch: char, mode: Mode },

    // Out of range
    #[error("invalid version: {0}")]
    InvalidVersion(usize),
    #[error("invalid masking pattern: {0}")]
    InvalidMaskingPattern(u8),
    #[error("invalid ECI designator: {0}")]
    InvalidEciDesignator(u32),
    #[error("bit index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // Capacity
    #[error("data too long")]
    DataTooLong,
}

pub type QRResult<T> = Result<T, QRError>;
