//! Streak and completion-rate calculation.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;

/// Lookback cap for the current streak walk.
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 365;
/// Window used by the detail screen rate.
pub const DEFAULT_RATE_WINDOW_DAYS: u32 = 30;

/// Local calendar day of a stored timestamp.
pub fn local_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Distinct local days that have at least one completion.
pub fn completed_days<Tz: TimeZone>(dates: &[DateTime<Utc>], tz: &Tz) -> BTreeSet<NaiveDate> {
    dates.iter().map(|instant| local_day(instant, tz)).collect()
}

/// Returns whether any completion falls on `now`'s local day.
///
/// Append order is not trusted: sync can append out of chronological order.
pub fn is_completed_today<Tz: TimeZone>(dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> bool {
    let today = now.date_naive();
    let tz = now.timezone();
    dates.iter().any(|instant| local_day(instant, &tz) == today)
}

/// Consecutive completed days ending at today; 0 when today is not completed.
pub fn current_streak<Tz: TimeZone>(dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> u32 {
    let days = completed_days(dates, &now.timezone());
    let mut day = now.date_naive();
    let mut streak = 0;

    for _ in 0..MAX_STREAK_LOOKBACK_DAYS {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }

    streak
}

/// Longest run of consecutive completed days anywhere in history.
pub fn best_streak<Tz: TimeZone>(dates: &[DateTime<Utc>], tz: &Tz) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in completed_days(dates, tz) {
        let continues = previous
            .and_then(|prev| prev.succ_opt())
            .is_some_and(|next| next == day);
        run = if continues { run + 1 } else { 1 };
        best = best.max(run);
        previous = Some(day);
    }

    best
}

/// Percentage of `days` with a completion inside `[now - days, now]`.
///
/// Completions are deduplicated per local day and the result is capped at
/// 100, so repeated same-day timestamps cannot inflate the rate.
pub fn completion_rate<Tz: TimeZone>(dates: &[DateTime<Utc>], days: u32, now: &DateTime<Tz>) -> f64 {
    if days == 0 {
        return 0.0;
    }

    let end = now.with_timezone(&Utc);
    let start = end - Duration::days(i64::from(days));
    let tz = now.timezone();
    let in_window: BTreeSet<NaiveDate> = dates
        .iter()
        .filter(|instant| **instant >= start && **instant <= end)
        .map(|instant| local_day(instant, &tz))
        .collect();

    let rate = in_window.len() as f64 / f64::from(days) * 100.0;
    rate.min(100.0)
}
