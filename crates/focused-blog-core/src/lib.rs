//! # Focused Blog Core
//!
//! Pure primitives for Focused Blog: accounts, token identifiers, post
//! records, and the streak derivation over post timestamps.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`AccountId`] - 20-byte account identifier, the zero value is the null account
//! - [`TokenId`] - Sequential identifier of a minted post token
//! - [`PostRecord`] - Immutable (uri, author, timestamp) tuple behind a token
//! - [`StreakCounter`] - Backward walk over an author's timestamps
//! - [`RegistryEvent`] - Notifications emitted on mint and transfer
//!
//! ## Streaks
//!
//! A streak counts consecutive gaps between adjacent posts that are shorter
//! than [`TWO_WEEKS_SECONDS`], ending at the newest post. See [`streak`].

pub mod clock;
pub mod error;
pub mod event;
pub mod post;
pub mod streak;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use event::RegistryEvent;
pub use post::PostRecord;
pub use streak::{streak_from_timestamps, StreakCounter, StreakStatus, TWO_WEEKS_SECONDS};
pub use types::{AccountId, TokenId};
