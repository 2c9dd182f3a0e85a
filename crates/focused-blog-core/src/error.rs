//! Error types for Focused Blog Core.

use thiserror::Error;

/// Core errors raised while parsing or encoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::InvalidAccountId(e.to_string())
    }
}
