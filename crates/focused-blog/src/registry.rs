//! The Registry: one token per published post, plus streaks.
//!
//! The Registry brings together the store, a clock and an event channel.
//! It is the only writer of the ledger: mutations are serialized behind a
//! single async mutex so the clock is read and the commit applied as one
//! step.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use focused_blog_core::{
    AccountId, Clock, PostRecord, RegistryEvent, StreakCounter, StreakStatus, SystemClock,
    TokenId,
};
use focused_blog_store::{MemoryStore, Store, StoreExt};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Publishing posts (minting one token each)
/// - Computing publishing streaks
/// - Querying post records and the ownership index
/// - Transferring tokens
/// - Subscribing to ledger events
pub struct Registry<S: Store, C: Clock = SystemClock> {
    /// The storage backend.
    store: Arc<S>,
    /// Source of post timestamps.
    clock: C,
    /// Configuration.
    config: RegistryConfig,
    /// Held from clock read to commit.
    write_lock: Mutex<()>,
    /// Event fan-out.
    events: broadcast::Sender<RegistryEvent>,
}

impl Registry<MemoryStore, SystemClock> {
    /// An in-memory registry on the wall clock.
    pub fn in_memory(config: RegistryConfig) -> Result<Self> {
        Self::new(MemoryStore::new(), SystemClock, config)
    }
}

impl<S: Store, C: Clock> Registry<S, C> {
    /// Create a new registry instance.
    ///
    /// Fails with `InvalidConfig` if the configuration does not validate.
    pub fn new(store: S, clock: C, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            store: Arc::new(store),
            clock,
            config,
            write_lock: Mutex::new(()),
            events,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the clock reference.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Collection symbol.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Receive every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RegistryEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publishing
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a post for `author`.
    ///
    /// Mints the next token to the author and records the post with the
    /// current clock time. The URI is stored as given.
    pub async fn publish_blog(&self, author: &AccountId, uri: &str) -> Result<TokenId> {
        if author.is_zero() {
            warn!("rejected publish for the null account");
            return Err(RegistryError::InvalidAuthor);
        }

        // Events go out under the lock so subscribers see them in mint order.
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();
        let post = self.store.publish_post(author, uri, now).await?;

        info!(token_id = %post.token_id, %author, published_at = post.published_at, "published post");

        self.emit(RegistryEvent::Transfer {
            from: None,
            to: *author,
            token_id: post.token_id,
        });
        self.emit(RegistryEvent::PostPublished {
            token_id: post.token_id,
            author: *author,
            post_uri: post.post_uri,
            published_at: post.published_at,
        });

        Ok(post.token_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Streaks
    // ─────────────────────────────────────────────────────────────────────────

    /// The author's current streak.
    ///
    /// Walks the author's posts from newest to oldest and counts adjacent
    /// gaps shorter than the configured window, stopping at the first one
    /// that is not. Zero and one post both give `0`.
    pub async fn current_streak(&self, author: &AccountId) -> Result<u64> {
        let count = self.store.author_post_count(author).await?;
        self.streak_over(author, count).await
    }

    /// The author's streak as a state: no posts, a single baseline post, or
    /// an active streak.
    pub async fn streak_status(&self, author: &AccountId) -> Result<StreakStatus> {
        let count = self.store.author_post_count(author).await?;
        let streak = self.streak_over(author, count).await?;
        Ok(StreakStatus::from_parts(count, streak))
    }

    /// Streak over the author's first `count` posts.
    ///
    /// History is append-only, so indices below `count` stay valid even if a
    /// publish lands mid-walk.
    async fn streak_over(&self, author: &AccountId, count: u64) -> Result<u64> {
        if count < 2 {
            return Ok(0);
        }

        let mut counter = StreakCounter::new(self.config.streak_window);
        for index in (0..count).rev() {
            let post = self.history_post_at(author, index, count).await?;
            if !counter.push(post.published_at) {
                break;
            }
        }

        debug!(%author, posts = count, streak = counter.streak(), "computed streak");
        Ok(counter.streak())
    }

    async fn history_post_at(
        &self,
        author: &AccountId,
        index: u64,
        count: u64,
    ) -> Result<PostRecord> {
        let token_id = self
            .store
            .author_post_at(author, index)
            .await?
            .ok_or(RegistryError::IndexOutOfRange {
                owner: *author,
                index,
                count,
            })?;
        self.post_record(token_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Post Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The post behind a token.
    pub async fn post_record(&self, token_id: TokenId) -> Result<PostRecord> {
        self.store
            .get_post(token_id)
            .await?
            .ok_or(RegistryError::UnknownToken(token_id))
    }

    /// Metadata URI of a token: its post URI.
    pub async fn token_uri(&self, token_id: TokenId) -> Result<String> {
        Ok(self.post_record(token_id).await?.post_uri)
    }

    /// Number of posts the author has published.
    pub async fn post_count_of(&self, author: &AccountId) -> Result<u64> {
        Ok(self.store.author_post_count(author).await?)
    }

    /// Every post by the author, oldest first.
    pub async fn posts_by(&self, author: &AccountId) -> Result<Vec<PostRecord>> {
        Ok(self.store.author_history(author).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ownership Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of tokens held by `owner`.
    pub async fn balance_of(&self, owner: &AccountId) -> Result<u64> {
        Ok(self.store.balance_of(owner).await?)
    }

    /// The `index`-th token held by `owner`.
    pub async fn token_of_owner_by_index(&self, owner: &AccountId, index: u64) -> Result<TokenId> {
        if let Some(token_id) = self.store.token_of_owner_by_index(owner, index).await? {
            return Ok(token_id);
        }
        let count = self.store.balance_of(owner).await?;
        Err(RegistryError::IndexOutOfRange {
            owner: *owner,
            index,
            count,
        })
    }

    /// Current owner of a token.
    pub async fn owner_of(&self, token_id: TokenId) -> Result<AccountId> {
        self.store
            .owner_of(token_id)
            .await?
            .ok_or(RegistryError::UnknownToken(token_id))
    }

    /// Total number of minted tokens.
    pub async fn total_supply(&self) -> Result<u64> {
        Ok(self.store.total_supply().await?)
    }

    /// The `index`-th minted token.
    pub async fn token_by_index(&self, index: u64) -> Result<TokenId> {
        if let Some(token_id) = self.store.token_by_index(index).await? {
            return Ok(token_id);
        }
        let total = self.store.total_supply().await?;
        Err(RegistryError::SupplyIndexOutOfRange { index, total })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transfers
    // ─────────────────────────────────────────────────────────────────────────

    /// Move a token from `from` to `to`.
    ///
    /// Only ownership changes. The post record and the original author's
    /// history, and so every streak, are left alone.
    pub async fn transfer(&self, from: &AccountId, to: &AccountId, token_id: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(RegistryError::InvalidRecipient);
        }

        let _guard = self.write_lock.lock().await;
        self.store.transfer(from, to, token_id).await?;

        info!(%token_id, %from, %to, "transferred token");

        if from != to {
            self.emit(RegistryEvent::Transfer {
                from: Some(*from),
                to: *to,
                token_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use focused_blog_core::ManualClock;
    use focused_blog_store::Result as StoreResult;

    const START: i64 = 1_700_000_000;

    fn registry() -> (Registry<MemoryStore, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let registry = Registry::new(
            MemoryStore::new(),
            Arc::clone(&clock),
            RegistryConfig::default(),
        )
        .unwrap();
        (registry, clock)
    }

    #[tokio::test]
    async fn test_publish_mints_to_author() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");

        registry
            .publish_blog(&author, "https://example.com")
            .await
            .unwrap();

        assert_eq!(registry.balance_of(&author).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_publish_creates_post_record() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");

        registry
            .publish_blog(&author, "https://example.com")
            .await
            .unwrap();

        let token_id = registry.token_of_owner_by_index(&author, 0).await.unwrap();
        let post = registry.post_record(token_id).await.unwrap();
        assert_eq!(post.post_uri, "https://example.com");
        assert_eq!(post.original_author, author);
        assert_eq!(post.published_at, START);
    }

    #[tokio::test]
    async fn test_null_author_rejected() {
        let (registry, _) = registry();
        let mut events = registry.subscribe();

        let err = registry
            .publish_blog(&AccountId::ZERO, "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidAuthor));
        assert_eq!(registry.total_supply().await.unwrap(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_streak_zero_without_posts() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");
        assert_eq!(registry.current_streak(&author).await.unwrap(), 0);
        assert_eq!(
            registry.streak_status(&author).await.unwrap(),
            StreakStatus::NoPosts
        );
    }

    #[tokio::test]
    async fn test_streak_zero_with_single_post() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");
        registry.publish_blog(&author, "a").await.unwrap();

        assert_eq!(registry.current_streak(&author).await.unwrap(), 0);
        assert_eq!(
            registry.streak_status(&author).await.unwrap(),
            StreakStatus::SinglePost
        );
    }

    #[tokio::test]
    async fn test_streak_is_per_author() {
        let (registry, clock) = registry();
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");

        registry.publish_blog(&alice, "a0").await.unwrap();
        clock.advance(60);
        registry.publish_blog(&bob, "b0").await.unwrap();
        clock.advance(60);
        registry.publish_blog(&alice, "a1").await.unwrap();

        assert_eq!(registry.current_streak(&alice).await.unwrap(), 1);
        assert_eq!(registry.current_streak(&bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_custom_window() {
        let clock = Arc::new(ManualClock::new(START));
        let config = RegistryConfig {
            streak_window: 100,
            ..RegistryConfig::default()
        };
        let registry = Registry::new(MemoryStore::new(), Arc::clone(&clock), config).unwrap();
        let author = AccountId::derive("alice");

        registry.publish_blog(&author, "a").await.unwrap();
        clock.advance(99);
        registry.publish_blog(&author, "b").await.unwrap();
        assert_eq!(registry.current_streak(&author).await.unwrap(), 1);

        clock.advance(100);
        registry.publish_blog(&author, "c").await.unwrap();
        assert_eq!(registry.current_streak(&author).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (registry, _) = registry();
        assert!(matches!(
            registry.post_record(TokenId(3)).await,
            Err(RegistryError::UnknownToken(TokenId(3)))
        ));
        assert!(matches!(
            registry.owner_of(TokenId(3)).await,
            Err(RegistryError::UnknownToken(TokenId(3)))
        ));
        assert!(matches!(
            registry.token_uri(TokenId(3)).await,
            Err(RegistryError::UnknownToken(TokenId(3)))
        ));
    }

    #[tokio::test]
    async fn test_index_out_of_range() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");
        registry.publish_blog(&author, "a").await.unwrap();

        let err = registry.token_of_owner_by_index(&author, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IndexOutOfRange { index: 1, count: 1, .. }
        ));

        let err = registry.token_by_index(5).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::SupplyIndexOutOfRange { index: 5, total: 1 }
        ));
    }

    #[tokio::test]
    async fn test_events_on_publish_and_transfer() {
        let (registry, _) = registry();
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");
        let mut events = registry.subscribe();

        let token_id = registry.publish_blog(&alice, "uri").await.unwrap();
        registry.transfer(&alice, &bob, token_id).await.unwrap();

        let mint = events.recv().await.unwrap();
        assert!(mint.is_mint());
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::PostPublished {
                token_id,
                author: alice,
                post_uri: "uri".into(),
                published_at: START,
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::Transfer {
                from: Some(alice),
                to: bob,
                token_id,
            }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RegistryConfig {
            streak_window: 0,
            ..RegistryConfig::default()
        };
        let result = Registry::new(MemoryStore::new(), ManualClock::new(START), config);
        assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));

        let config = RegistryConfig {
            event_capacity: 0,
            ..RegistryConfig::default()
        };
        assert!(matches!(
            Registry::in_memory(config),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishes_emit_in_mint_order() {
        let (registry, _) = registry();
        let registry = Arc::new(registry);
        let mut events = registry.subscribe();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let author = AccountId::derive(&format!("author-{}", i));
                    registry.publish_blog(&author, "p").await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut minted = Vec::new();
        while let Ok(event) = events.try_recv() {
            if event.is_mint() {
                minted.push(event.token_id());
            }
        }
        let expected: Vec<_> = (0..32).map(TokenId).collect();
        assert_eq!(minted, expected);
    }

    /// Counts history lookups on top of a memory store.
    struct CountingStore {
        inner: MemoryStore,
        history_reads: AtomicU64,
    }

    #[async_trait]
    impl Store for CountingStore {
        async fn publish_post(
            &self,
            author: &AccountId,
            post_uri: &str,
            published_at: i64,
        ) -> StoreResult<PostRecord> {
            self.inner.publish_post(author, post_uri, published_at).await
        }

        async fn get_post(&self, token_id: TokenId) -> StoreResult<Option<PostRecord>> {
            self.inner.get_post(token_id).await
        }

        async fn author_post_count(&self, author: &AccountId) -> StoreResult<u64> {
            self.inner.author_post_count(author).await
        }

        async fn author_post_at(
            &self,
            author: &AccountId,
            index: u64,
        ) -> StoreResult<Option<TokenId>> {
            self.history_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.author_post_at(author, index).await
        }

        async fn balance_of(&self, owner: &AccountId) -> StoreResult<u64> {
            self.inner.balance_of(owner).await
        }

        async fn token_of_owner_by_index(
            &self,
            owner: &AccountId,
            index: u64,
        ) -> StoreResult<Option<TokenId>> {
            self.inner.token_of_owner_by_index(owner, index).await
        }

        async fn owner_of(&self, token_id: TokenId) -> StoreResult<Option<AccountId>> {
            self.inner.owner_of(token_id).await
        }

        async fn total_supply(&self) -> StoreResult<u64> {
            self.inner.total_supply().await
        }

        async fn token_by_index(&self, index: u64) -> StoreResult<Option<TokenId>> {
            self.inner.token_by_index(index).await
        }

        async fn transfer(
            &self,
            from: &AccountId,
            to: &AccountId,
            token_id: TokenId,
        ) -> StoreResult<()> {
            self.inner.transfer(from, to, token_id).await
        }
    }

    #[tokio::test]
    async fn test_streak_walk_stops_at_break() {
        let clock = Arc::new(ManualClock::new(START));
        let store = CountingStore {
            inner: MemoryStore::new(),
            history_reads: AtomicU64::new(0),
        };
        let registry = Registry::new(store, Arc::clone(&clock), RegistryConfig::default()).unwrap();
        let author = AccountId::derive("alice");

        // Seven posts a minute apart, three weeks off, then three more.
        for _ in 0..7 {
            registry.publish_blog(&author, "old").await.unwrap();
            clock.advance(60);
        }
        clock.advance(3 * 7 * 24 * 60 * 60);
        for _ in 0..3 {
            registry.publish_blog(&author, "new").await.unwrap();
            clock.advance(60);
        }

        assert_eq!(registry.current_streak(&author).await.unwrap(), 2);
        // Three unbroken posts plus the one that breaks the chain.
        assert_eq!(registry.store().history_reads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_metadata() {
        let (registry, _) = registry();
        let author = AccountId::derive("alice");
        let token_id = registry.publish_blog(&author, "ipfs://post").await.unwrap();

        assert_eq!(registry.name(), "FocusedBlogPost");
        assert_eq!(registry.symbol(), "FBP");
        assert_eq!(registry.token_uri(token_id).await.unwrap(), "ipfs://post");
    }
}
