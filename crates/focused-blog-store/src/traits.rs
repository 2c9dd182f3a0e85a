//! Store trait: the abstract interface for ledger persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use focused_blog_core::{AccountId, PostRecord, TokenId};

use crate::error::{Result, StoreError};

/// The Store trait: async interface for the ownership and post ledgers.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Atomic publish**: `publish_post` mints and records in a single commit.
///   A failed call leaves no trace.
/// - **Index lookups return `Option`**: an index past the end is `None`, the
///   caller decides whether that is an error.
/// - **Transfers**: removal from the sender's index swaps the last token into
///   the vacated slot.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Post Ledger
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint the next token to `author` and record its post.
    ///
    /// Fails with `InvalidAuthor` for the null account.
    async fn publish_post(
        &self,
        author: &AccountId,
        post_uri: &str,
        published_at: i64,
    ) -> Result<PostRecord>;

    /// Get the post behind a token.
    async fn get_post(&self, token_id: TokenId) -> Result<Option<PostRecord>>;

    /// Number of posts an author has published.
    async fn author_post_count(&self, author: &AccountId) -> Result<u64>;

    /// The author's `index`-th post, in publish order.
    async fn author_post_at(&self, author: &AccountId, index: u64) -> Result<Option<TokenId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Ownership Ledger
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of tokens currently held by `owner`.
    async fn balance_of(&self, owner: &AccountId) -> Result<u64>;

    /// The `index`-th token held by `owner`.
    async fn token_of_owner_by_index(
        &self,
        owner: &AccountId,
        index: u64,
    ) -> Result<Option<TokenId>>;

    /// Current owner of a token.
    async fn owner_of(&self, token_id: TokenId) -> Result<Option<AccountId>>;

    /// Total number of minted tokens.
    async fn total_supply(&self) -> Result<u64>;

    /// The `index`-th minted token.
    async fn token_by_index(&self, index: u64) -> Result<Option<TokenId>>;

    /// Move a token from `from` to `to`.
    ///
    /// Fails with `UnknownToken`, `NotOwner` or `InvalidRecipient`.
    async fn transfer(&self, from: &AccountId, to: &AccountId, token_id: TokenId) -> Result<()>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// All posts by an author, oldest first.
    fn author_history(
        &self,
        author: &AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<PostRecord>>> + Send;

    /// All tokens currently held by an owner, in index order.
    fn tokens_of_owner(
        &self,
        owner: &AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<TokenId>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn author_history(&self, author: &AccountId) -> Result<Vec<PostRecord>> {
        let count = self.author_post_count(author).await?;
        let mut posts = Vec::with_capacity(count as usize);

        for index in 0..count {
            let token_id = self.author_post_at(author, index).await?.ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "history of {} has no entry {} of {}",
                    author, index, count
                ))
            })?;
            let post = self.get_post(token_id).await?.ok_or_else(|| {
                StoreError::InvalidData(format!("{} in history but has no post", token_id))
            })?;
            posts.push(post);
        }

        Ok(posts)
    }

    async fn tokens_of_owner(&self, owner: &AccountId) -> Result<Vec<TokenId>> {
        let balance = self.balance_of(owner).await?;
        let mut tokens = Vec::with_capacity(balance as usize);

        for index in 0..balance {
            let token_id = self.token_of_owner_by_index(owner, index).await?.ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "{} holds {} tokens but has no entry {}",
                    owner, balance, index
                ))
            })?;
            tokens.push(token_id);
        }

        Ok(tokens)
    }
}
