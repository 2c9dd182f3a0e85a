//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a registry driven by a
//! [`ManualClock`] so tests control every timestamp.

use std::path::Path;
use std::sync::Arc;

use focused_blog::{Registry, RegistryConfig, Result};
use focused_blog_core::{AccountId, ManualClock, TokenId};
use focused_blog_store::{MemoryStore, SqliteStore, Store};

use crate::scenarios::StreakScenario;

/// Clock time every fixture starts at: 2023-11-14T22:13:20Z.
pub const START_TIME: i64 = 1_700_000_000;

/// A registry on a manual clock, with a default author.
pub struct TestFixture<S: Store = MemoryStore> {
    pub author: AccountId,
    pub clock: Arc<ManualClock>,
    pub registry: Registry<S, Arc<ManualClock>>,
}

impl TestFixture<MemoryStore> {
    /// Create a new fixture over an in-memory store.
    pub fn new() -> Self {
        Self::with_label("author")
    }

    /// Create with an author derived from `label`.
    pub fn with_label(label: &str) -> Self {
        Self::with_store(label, MemoryStore::new(), RegistryConfig::default())
            .expect("default config is valid")
    }
}

impl TestFixture<SqliteStore> {
    /// Create a fixture over an SQLite database at `path`.
    pub fn sqlite(path: impl AsRef<Path>) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        Self::with_store("author", store, RegistryConfig::default())
    }
}

impl<S: Store> TestFixture<S> {
    /// Create over an existing store.
    ///
    /// Fails if `config` does not validate.
    pub fn with_store(label: &str, store: S, config: RegistryConfig) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(START_TIME));
        Ok(Self {
            author: AccountId::derive(label),
            registry: Registry::new(store, Arc::clone(&clock), config)?,
            clock,
        })
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: i64) -> i64 {
        self.clock.advance(secs)
    }

    /// Publish as the fixture's author at the current clock time.
    pub async fn publish(&self, uri: &str) -> Result<TokenId> {
        self.registry.publish_blog(&self.author, uri).await
    }

    /// Wait `gap` seconds, then publish.
    pub async fn publish_after(&self, gap: i64, uri: &str) -> Result<TokenId> {
        self.advance(gap);
        self.publish(uri).await
    }

    /// The fixture author's current streak.
    pub async fn streak(&self) -> Result<u64> {
        self.registry.current_streak(&self.author).await
    }

    /// Play a scenario and record the streak after each post.
    pub async fn run_scenario(&self, scenario: &StreakScenario) -> Result<Vec<u64>> {
        let mut streaks = Vec::with_capacity(scenario.expected.len());

        self.publish(&format!("{}/0", scenario.name)).await?;
        streaks.push(self.streak().await?);

        for (i, gap) in scenario.gaps.iter().enumerate() {
            self.publish_after(*gap, &format!("{}/{}", scenario.name, i + 1))
                .await?;
            streaks.push(self.streak().await?);
        }

        Ok(streaks)
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct authors.
pub fn multi_author_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_label(&format!("author-{}", i)))
        .collect()
}
