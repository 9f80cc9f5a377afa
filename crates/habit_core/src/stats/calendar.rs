//! Calendar grid and week strip layout.

use super::streak::completed_days;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// Days shown by the week chart.
pub const WEEK_STRIP_DAYS: usize = 7;

/// One rendered day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub completed: bool,
    pub is_today: bool,
    /// Two-letter uppercase weekday, e.g. `MO`.
    pub label: String,
}

/// Month grid for `today`'s month, Monday-first, with leading blanks only.
pub fn month_grid(today: NaiveDate) -> Vec<Option<NaiveDate>> {
    let Some(first) = today.with_day(1) else {
        return Vec::new();
    };
    let leading = first.weekday().num_days_from_monday() as usize;

    let mut grid = vec![None; leading];
    grid.extend(
        first
            .iter_days()
            .take_while(|day| day.month() == first.month())
            .map(Some),
    );
    grid
}

/// The `n` days ending at and including `today`, oldest first.
pub fn last_n_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n as u64)
        .rev()
        .filter_map(|ago| today.checked_sub_days(Days::new(ago)))
        .collect()
}

/// Month grid annotated with completion state.
pub fn month_marks<Tz: TimeZone>(dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> Vec<Option<DayMark>> {
    let today = now.date_naive();
    let done = completed_days(dates, &now.timezone());
    month_grid(today)
        .into_iter()
        .map(|cell| {
            cell.map(|date| DayMark {
                date,
                completed: done.contains(&date),
                is_today: date == today,
                label: weekday_label(date),
            })
        })
        .collect()
}

/// Last seven days annotated with completion state.
pub fn week_strip<Tz: TimeZone>(dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> Vec<DayMark> {
    let today = now.date_naive();
    let done = completed_days(dates, &now.timezone());
    last_n_days(today, WEEK_STRIP_DAYS)
        .into_iter()
        .map(|date| DayMark {
            date,
            completed: done.contains(&date),
            is_today: date == today,
            label: weekday_label(date),
        })
        .collect()
}

fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string().chars().take(2).collect::<String>().to_uppercase()
}
