//! # Focused Blog Store
//!
//! Storage for the two ledgers behind the registry: the transferable
//! ownership index and the append-only post ledger with its per-author
//! history. Provides the [`Store`] trait with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use focused_blog_core::AccountId;
//! use focused_blog_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("blog.db").unwrap();
//!
//!     let author = AccountId::derive("alice");
//!     let post = store
//!         .publish_post(&author, "https://example.com", 1_700_000_000)
//!         .await
//!         .unwrap();
//!     assert_eq!(store.balance_of(&author).await.unwrap(), 1);
//!     assert_eq!(store.owner_of(post.token_id).await.unwrap(), Some(author));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic publish**: minting and recording the post happen in one commit
//! - **Sequential ids**: token ids start at a fixed origin and are never reused
//! - **Separate history**: transfers move ownership entries but never touch
//!   post records or author history

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
