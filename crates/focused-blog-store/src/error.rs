//! Error types for the store module.

use focused_blog_core::{AccountId, TokenId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Mint requested for the null account.
    #[error("cannot mint to the null account")]
    InvalidAuthor,

    /// Transfer requested to the null account.
    #[error("cannot transfer to the null account")]
    InvalidRecipient,

    /// No token with this id was ever minted.
    #[error("unknown token: {0}")]
    UnknownToken(TokenId),

    /// Transfer source does not own the token.
    #[error("{claimed} does not own token {token_id}")]
    NotOwner {
        token_id: TokenId,
        claimed: AccountId,
    },

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
