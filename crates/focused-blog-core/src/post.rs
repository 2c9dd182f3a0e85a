//! Post records: the immutable payload behind each minted token.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, TokenId};

/// One published post.
///
/// Created exactly once when the token is minted and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// The token this post is bound to.
    pub token_id: TokenId,

    /// Opaque reference to the post content, stored as given.
    pub post_uri: String,

    /// The account that published the post.
    pub original_author: AccountId,

    /// Seconds since the Unix epoch, taken from the registry clock.
    pub published_at: i64,
}

impl PostRecord {
    pub fn new(
        token_id: TokenId,
        post_uri: impl Into<String>,
        original_author: AccountId,
        published_at: i64,
    ) -> Self {
        Self {
            token_id,
            post_uri: post_uri.into(),
            original_author,
            published_at,
        }
    }
}
