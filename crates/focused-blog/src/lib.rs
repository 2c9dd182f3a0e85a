//! # Focused Blog
//!
//! Issues one non-fungible token per published post to its author and
//! derives each author's publishing streak: the number of consecutive gaps
//! shorter than fourteen days leading up to their newest post.
//!
//! ## Overview
//!
//! - **Posts**: Immutable (uri, author, timestamp) records, one per token
//! - **Tokens**: Sequential ids minted to the author, transferable
//! - **Streaks**: Recomputed on every query from the author's history
//! - **Events**: Mint, transfer and publish notifications via [`Registry::subscribe`]
//!
//! ## Key Concepts
//!
//! - **Append-only**: Posts are never edited or deleted; ids are never reused.
//! - **History vs ownership**: Transfers move tokens between owners but the
//!   original author's history, and therefore their streak, never changes.
//! - **Clock**: Timestamps come from the registry's [`Clock`], not the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use focused_blog::{AccountId, Registry, RegistryConfig};
//! use focused_blog::core::SystemClock;
//! use focused_blog::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("blog.db").unwrap();
//!     let registry = Registry::new(store, SystemClock, RegistryConfig::default()).unwrap();
//!
//!     let author = AccountId::derive("alice");
//!     let token_id = registry
//!         .publish_blog(&author, "https://example.com/first")
//!         .await
//!         .unwrap();
//!
//!     let post = registry.post_record(token_id).await.unwrap();
//!     assert_eq!(post.original_author, author);
//!
//!     let streak = registry.current_streak(&author).await.unwrap();
//!     assert_eq!(streak, 0);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `focused_blog::core` - Core primitives (AccountId, PostRecord, streaks)
//! - `focused_blog::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod registry;

// Re-export component crates
pub use focused_blog_core as core;
pub use focused_blog_store as store;

// Re-export main types for convenience
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::Registry;

// Re-export commonly used core types
pub use focused_blog_core::{
    AccountId, Clock, ManualClock, PostRecord, RegistryEvent, StreakStatus, SystemClock, TokenId,
    TWO_WEEKS_SECONDS,
};
