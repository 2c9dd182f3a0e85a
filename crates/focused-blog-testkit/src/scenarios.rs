//! Known publishing schedules and the streak after each post.
//!
//! Each scenario starts with a baseline post at [`START_TIME`], then waits
//! `gaps[i]` seconds before publishing again. `expected[i]` is the streak
//! right after post `i`, so `expected` is one longer than `gaps`.
//!
//! [`START_TIME`]: crate::fixtures::START_TIME

use focused_blog_core::TWO_WEEKS_SECONDS;

/// The longest gap that keeps a streak alive.
pub const JUST_UNDER_WINDOW: i64 = TWO_WEEKS_SECONDS - 1;

/// A publishing schedule with expected streaks.
#[derive(Debug, Clone)]
pub struct StreakScenario {
    /// Human-readable name for the scenario.
    pub name: &'static str,
    /// Seconds waited before each post after the first.
    pub gaps: Vec<i64>,
    /// Streak after each post, baseline included.
    pub expected: Vec<u64>,
}

/// Get all scenarios.
pub fn all_scenarios() -> Vec<StreakScenario> {
    vec![
        StreakScenario {
            name: "single post",
            gaps: vec![],
            expected: vec![0],
        },
        StreakScenario {
            name: "one gap just under two weeks",
            gaps: vec![JUST_UNDER_WINDOW],
            expected: vec![0, 1],
        },
        StreakScenario {
            name: "two gaps just under two weeks",
            gaps: vec![JUST_UNDER_WINDOW, JUST_UNDER_WINDOW],
            expected: vec![0, 1, 2],
        },
        StreakScenario {
            name: "break at exactly two weeks, then rebuild",
            gaps: vec![
                JUST_UNDER_WINDOW,
                TWO_WEEKS_SECONDS,
                JUST_UNDER_WINDOW,
                JUST_UNDER_WINDOW,
                JUST_UNDER_WINDOW,
            ],
            expected: vec![0, 1, 0, 1, 2, 3],
        },
        StreakScenario {
            name: "streak of two, break, streak of three",
            gaps: vec![
                JUST_UNDER_WINDOW,
                JUST_UNDER_WINDOW,
                TWO_WEEKS_SECONDS,
                JUST_UNDER_WINDOW,
                JUST_UNDER_WINDOW,
                JUST_UNDER_WINDOW,
            ],
            expected: vec![0, 1, 2, 0, 1, 2, 3],
        },
        StreakScenario {
            name: "same-second posts",
            gaps: vec![0, 0, 0],
            expected: vec![0, 1, 2, 3],
        },
        StreakScenario {
            name: "long silence",
            gaps: vec![60, 60, 365 * 24 * 60 * 60],
            expected: vec![0, 1, 2, 0],
        },
    ]
}

/// Sanity-check a scenario's shape.
pub fn is_well_formed(scenario: &StreakScenario) -> bool {
    scenario.expected.len() == scenario.gaps.len() + 1
        && scenario.expected.first() == Some(&0)
        && scenario.gaps.iter().all(|g| *g >= 0)
}
