//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use focused_blog_core::{AccountId, PostRecord, TokenId};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; each
/// mutation happens under a single write guard.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Next id to mint.
    next_token_id: TokenId,

    /// Every minted token, in mint order.
    all_tokens: Vec<TokenId>,

    /// Post records indexed by token.
    posts: BTreeMap<TokenId, PostRecord>,

    /// Current owner of each token.
    owners: HashMap<TokenId, AccountId>,

    /// Ownership index: owner -> held tokens.
    owned: HashMap<AccountId, Vec<TokenId>>,

    /// Author history: author -> published tokens, append-only.
    history: HashMap<AccountId, Vec<TokenId>>,
}

impl MemoryStore {
    /// Create a new empty store minting from token id 0.
    pub fn new() -> Self {
        Self::with_origin(TokenId(0))
    }

    /// Create a new empty store minting from `origin`.
    pub fn with_origin(origin: TokenId) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                next_token_id: origin,
                all_tokens: Vec::new(),
                posts: BTreeMap::new(),
                owners: HashMap::new(),
                owned: HashMap::new(),
                history: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn publish_post(
        &self,
        author: &AccountId,
        post_uri: &str,
        published_at: i64,
    ) -> Result<PostRecord> {
        if author.is_zero() {
            return Err(StoreError::InvalidAuthor);
        }

        let mut inner = self.write()?;

        let token_id = inner.next_token_id;
        let post = PostRecord::new(token_id, post_uri, *author, published_at);

        inner.next_token_id = token_id.next();
        inner.all_tokens.push(token_id);
        inner.owners.insert(token_id, *author);
        inner.owned.entry(*author).or_default().push(token_id);
        inner.history.entry(*author).or_default().push(token_id);
        inner.posts.insert(token_id, post.clone());

        debug!(%token_id, %author, published_at, "minted post token");
        Ok(post)
    }

    async fn get_post(&self, token_id: TokenId) -> Result<Option<PostRecord>> {
        let inner = self.read()?;
        Ok(inner.posts.get(&token_id).cloned())
    }

    async fn author_post_count(&self, author: &AccountId) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.history.get(author).map_or(0, |h| h.len() as u64))
    }

    async fn author_post_at(&self, author: &AccountId, index: u64) -> Result<Option<TokenId>> {
        let inner = self.read()?;
        Ok(inner
            .history
            .get(author)
            .and_then(|h| h.get(index as usize))
            .copied())
    }

    async fn balance_of(&self, owner: &AccountId) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.owned.get(owner).map_or(0, |t| t.len() as u64))
    }

    async fn token_of_owner_by_index(
        &self,
        owner: &AccountId,
        index: u64,
    ) -> Result<Option<TokenId>> {
        let inner = self.read()?;
        Ok(inner
            .owned
            .get(owner)
            .and_then(|t| t.get(index as usize))
            .copied())
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Option<AccountId>> {
        let inner = self.read()?;
        Ok(inner.owners.get(&token_id).copied())
    }

    async fn total_supply(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.all_tokens.len() as u64)
    }

    async fn token_by_index(&self, index: u64) -> Result<Option<TokenId>> {
        let inner = self.read()?;
        Ok(inner.all_tokens.get(index as usize).copied())
    }

    async fn transfer(&self, from: &AccountId, to: &AccountId, token_id: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(StoreError::InvalidRecipient);
        }

        let mut inner = self.write()?;

        let owner = *inner
            .owners
            .get(&token_id)
            .ok_or(StoreError::UnknownToken(token_id))?;
        if owner != *from {
            return Err(StoreError::NotOwner {
                token_id,
                claimed: *from,
            });
        }
        if from == to {
            return Ok(());
        }

        let held = inner.owned.entry(*from).or_default();
        let position = held
            .iter()
            .position(|t| *t == token_id)
            .ok_or_else(|| StoreError::InvalidData(format!("{} missing from owner index", token_id)))?;
        held.swap_remove(position);
        if held.is_empty() {
            inner.owned.remove(from);
        }

        inner.owned.entry(*to).or_default().push(token_id);
        inner.owners.insert(token_id, *to);

        debug!(%token_id, %from, %to, "transferred token");
        Ok(())
    }
}
