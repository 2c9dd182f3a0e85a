//! Error types for the Registry.

use focused_blog_core::{AccountId, TokenId};
use focused_blog_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
///
/// Every error leaves the ledger exactly as it was before the call.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Publish requested for the null account.
    #[error("invalid author: the null account cannot publish")]
    InvalidAuthor,

    /// Transfer requested to the null account.
    #[error("invalid recipient: the null account cannot own tokens")]
    InvalidRecipient,

    /// No post exists for this token.
    #[error("unknown token: {0}")]
    UnknownToken(TokenId),

    /// Lookup past the end of an account's tokens.
    #[error("index {index} out of range for {owner} holding {count} tokens")]
    IndexOutOfRange {
        owner: AccountId,
        index: u64,
        count: u64,
    },

    /// Lookup past the end of all minted tokens.
    #[error("index {index} out of range for total supply {total}")]
    SupplyIndexOutOfRange { index: u64, total: u64 },

    /// Transfer source does not own the token.
    #[error("{claimed} does not own token {token_id}")]
    NotOwner {
        token_id: TokenId,
        claimed: AccountId,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidAuthor => RegistryError::InvalidAuthor,
            StoreError::InvalidRecipient => RegistryError::InvalidRecipient,
            StoreError::UnknownToken(token_id) => RegistryError::UnknownToken(token_id),
            StoreError::NotOwner { token_id, claimed } => {
                RegistryError::NotOwner { token_id, claimed }
            }
            other => RegistryError::Store(other),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
