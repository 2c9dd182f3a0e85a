//! Notifications emitted by the registry.
//!
//! Events are plain serde values. [`RegistryEvent::to_cbor`] gives the wire
//! form handed to external consumers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{AccountId, TokenId};

/// Something observable happened to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// Ownership of a token changed. `from` is `None` on mint.
    Transfer {
        from: Option<AccountId>,
        to: AccountId,
        token_id: TokenId,
    },

    /// A post was recorded behind a freshly minted token.
    PostPublished {
        token_id: TokenId,
        author: AccountId,
        post_uri: String,
        published_at: i64,
    },
}

impl RegistryEvent {
    /// The token this event concerns.
    pub fn token_id(&self) -> TokenId {
        match self {
            RegistryEvent::Transfer { token_id, .. }
            | RegistryEvent::PostPublished { token_id, .. } => *token_id,
        }
    }

    pub fn is_mint(&self) -> bool {
        matches!(self, RegistryEvent::Transfer { from: None, .. })
    }

    /// Encode as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}
