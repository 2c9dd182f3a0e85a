//! Proptest generators for property-based testing.

use proptest::prelude::*;

use focused_blog_core::{AccountId, TWO_WEEKS_SECONDS};

/// Generate a non-null AccountId.
pub fn account_id() -> impl Strategy<Value = AccountId> {
    any::<[u8; 20]>()
        .prop_filter("null account", |b| b.iter().any(|x| *x != 0))
        .prop_map(AccountId::from_bytes)
}

/// A gap that keeps a two-week streak alive.
pub fn gap_within_window() -> impl Strategy<Value = i64> {
    0..TWO_WEEKS_SECONDS
}

/// A gap that breaks a two-week streak.
pub fn gap_breaking_window() -> impl Strategy<Value = i64> {
    TWO_WEEKS_SECONDS..=TWO_WEEKS_SECONDS * 52
}

/// Up to `max_len` gaps, each within the window.
pub fn gaps_within_window(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(gap_within_window(), 0..=max_len)
}

/// A gap either side of the window, biased towards the boundary.
pub fn any_gap() -> impl Strategy<Value = i64> {
    prop_oneof![
        4 => gap_within_window(),
        2 => gap_breaking_window(),
        1 => Just(TWO_WEEKS_SECONDS - 1),
        1 => Just(TWO_WEEKS_SECONDS),
    ]
}

/// A publishing schedule: a start time and the gaps between posts.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub start: i64,
    pub gaps: Vec<i64>,
}

impl Schedule {
    /// Timestamps of every post, oldest first.
    pub fn timestamps(&self) -> Vec<i64> {
        let mut at = self.start;
        let mut out = Vec::with_capacity(self.gaps.len() + 1);
        out.push(at);
        for gap in &self.gaps {
            at += gap;
            out.push(at);
        }
        out
    }

    /// Number of posts in the schedule.
    pub fn post_count(&self) -> usize {
        self.gaps.len() + 1
    }
}

impl Arbitrary for Schedule {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            0i64..=2_000_000_000i64, // start
            prop::collection::vec(any_gap(), 0..=24),
        )
            .prop_map(|(start, gaps)| Schedule { start, gaps })
            .boxed()
    }
}

/// Reference streak: trailing gaps under the window, counted naively.
pub fn expected_streak(gaps: &[i64], window: i64) -> u64 {
    gaps.iter().rev().take_while(|g| **g < window).count() as u64
}
