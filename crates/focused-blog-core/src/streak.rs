//! Streak derivation over an author's post timestamps.
//!
//! A streak is the number of consecutive gaps between adjacent posts that are
//! strictly shorter than the window, counted backward from the newest post.
//! Three posts a week apart give a streak of 2, not 3.
//!
//! Nothing here is persisted. Every query walks the history again:
//!
//! ```text
//! t0 ── g1 ── t1 ── g2 ── t2 ── g3 ── t3
//!                               ^^ first gap >= window stops the walk
//! ```

use serde::{Deserialize, Serialize};

/// Fourteen days in seconds. Gaps must be strictly shorter than this.
pub const TWO_WEEKS_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Whether two adjacent posts belong to the same streak.
///
/// A negative gap (clock stepped backwards) counts as zero.
pub fn within_window(earlier: i64, later: i64, window: i64) -> bool {
    later.saturating_sub(earlier).max(0) < window
}

/// Counts a streak while walking timestamps from newest to oldest.
///
/// Callers feed timestamps one by one and stop as soon as [`push`] returns
/// `false`, so only the unbroken tail of the history is ever resolved.
///
/// [`push`]: StreakCounter::push
#[derive(Debug, Clone)]
pub struct StreakCounter {
    window: i64,
    newer: Option<i64>,
    streak: u64,
    broken: bool,
}

impl StreakCounter {
    pub fn new(window: i64) -> Self {
        Self {
            window,
            newer: None,
            streak: 0,
            broken: false,
        }
    }

    /// Feed the next older timestamp.
    ///
    /// Returns `false` once the chain is broken; further pushes are ignored.
    pub fn push(&mut self, published_at: i64) -> bool {
        if self.broken {
            return false;
        }

        if let Some(newer) = self.newer {
            if !within_window(published_at, newer, self.window) {
                self.broken = true;
                return false;
            }
            self.streak += 1;
        }

        self.newer = Some(published_at);
        true
    }

    /// The streak counted so far.
    pub fn streak(&self) -> u64 {
        self.streak
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

/// Streak over timestamps given oldest first.
pub fn streak_from_timestamps(timestamps: &[i64], window: i64) -> u64 {
    let mut counter = StreakCounter::new(window);
    for &ts in timestamps.iter().rev() {
        if !counter.push(ts) {
            break;
        }
    }
    counter.streak()
}

/// State-machine view of an author's streak.
///
/// `NoPosts → SinglePost → Streak(1) → Streak(2) → ...`. A post outside the
/// window drops back to `SinglePost` with that post as the new baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakStatus {
    NoPosts,
    SinglePost,
    Streak(u64),
}

impl StreakStatus {
    pub fn from_parts(post_count: u64, streak: u64) -> Self {
        match (post_count, streak) {
            (0, _) => StreakStatus::NoPosts,
            (_, 0) => StreakStatus::SinglePost,
            (_, k) => StreakStatus::Streak(k),
        }
    }

    /// The numeric streak for this state.
    pub fn value(&self) -> u64 {
        match self {
            StreakStatus::NoPosts | StreakStatus::SinglePost => 0,
            StreakStatus::Streak(k) => *k,
        }
    }
}
