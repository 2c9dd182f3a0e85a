//! # Focused Blog Testkit
//!
//! Testing utilities for Focused Blog.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenarios**: Publishing schedules with the streak expected after each post
//! - **Generators**: Proptest strategies for gaps, schedules and accounts
//! - **Fixtures**: A registry on a manual clock, ready to publish
//!
//! ## Scenarios
//!
//! ```rust,ignore
//! use focused_blog_testkit::{all_scenarios, TestFixture};
//!
//! for scenario in all_scenarios() {
//!     let fixture = TestFixture::new();
//!     let streaks = fixture.run_scenario(&scenario).await.unwrap();
//!     assert_eq!(streaks, scenario.expected);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use focused_blog_testkit::generators::gaps_within_window;
//!
//! proptest! {
//!     #[test]
//!     fn unbroken_schedule(gaps in gaps_within_window(16)) {
//!         // every gap keeps the streak alive
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod scenarios;

pub use fixtures::{multi_author_fixtures, TestFixture, START_TIME};
pub use generators::{expected_streak, Schedule};
pub use scenarios::{all_scenarios, StreakScenario, JUST_UNDER_WINDOW};
