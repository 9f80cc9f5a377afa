//! Habit statistics and calendar layout.
//!
//! # Responsibility
//! - Derive completion state, streaks, and rates from completion timestamps.
//! - Build month/week layouts for the detail screen.
//!
//! # Invariants
//! - All functions are pure; `now` fixes both the instant and the local calendar.
//! - Multiple timestamps on one local day count as one completion.

pub mod calendar;
pub mod streak;

use crate::model::habit::Habit;
use chrono::{DateTime, TimeZone};
use serde::Serialize;

pub use streak::{DEFAULT_RATE_WINDOW_DAYS, MAX_STREAK_LOOKBACK_DAYS};

/// Summary shown on habit cards and the detail header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub completed_today: bool,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Percentage over the default 30 day window.
    pub completion_rate: f64,
    /// Raw number of stored timestamps.
    pub total_completions: usize,
}

impl HabitStats {
    pub fn compute<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> Self {
        let dates = habit.completed_dates.as_slice();
        Self {
            completed_today: streak::is_completed_today(dates, now),
            current_streak: streak::current_streak(dates, now),
            best_streak: streak::best_streak(dates, &now.timezone()),
            completion_rate: streak::completion_rate(dates, DEFAULT_RATE_WINDOW_DAYS, now),
            total_completions: dates.len(),
        }
    }
}
