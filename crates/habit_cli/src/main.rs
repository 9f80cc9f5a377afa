//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `habit_core` linkage without the Flutter runtime.
//! - Print a one-line summary per stored habit for quick local checks.

use chrono::Local;
use habit_core::db::open_db;
use habit_core::{DisabledReminders, HabitService, HabitStats, SqliteHabitStore};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("habit_core ping={}", habit_core::ping());
    println!("habit_core version={}", habit_core::core_version());

    let path = std::env::var("HABIT_DB_PATH")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("habit_tracker.sqlite3"));

    let conn = match open_db(&path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("habit_core db_open=error path={} error={err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let service = match HabitService::load(SqliteHabitStore::new(&conn), DisabledReminders) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("habit_core habits_load=error path={} error={err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let now = Local::now();
    println!("habit_core habits={}", service.habits().len());
    for habit in service.sorted_by_priority() {
        let stats = HabitStats::compute(&habit, &now);
        println!(
            "{} priority={} today={} streak={} best={} rate_30d={:.0}%",
            habit.id,
            habit.priority.as_str(),
            stats.completed_today,
            stats.current_streak,
            stats.best_streak,
            stats.completion_rate
        );
    }
    ExitCode::SUCCESS
}
