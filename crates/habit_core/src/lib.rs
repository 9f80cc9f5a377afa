//! Core domain logic for the habit tracker.
//! This crate is the single source of truth for habit invariants and statistics.

pub mod adapter;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use adapter::capability::DeviceCapability;
pub use adapter::health::{
    probe_today, HealthDaySummary, HealthProbe, SnapshotHealthProbe, STEPS_THRESHOLD,
    WATER_THRESHOLD_ML,
};
pub use adapter::reminder::{
    DisabledReminders, ReminderError, ReminderRegistry, ReminderRequest, ReminderScheduler,
};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::habit::{
    sort_by_priority, Habit, HabitId, HabitPriority, HabitValidationError, HealthDataType,
};
pub use model::quote::{quote_for_day, MotivationalQuote};
pub use repo::habit_store::{
    HabitStore, MemoryHabitStore, SqliteHabitStore, StoreError, StoreResult, HABITS_STORAGE_KEY,
};
pub use service::habit_service::{
    HabitService, ServiceError, ServiceResult, MAX_CONCURRENT_HEALTH_QUERIES,
};
pub use stats::calendar::{last_n_days, month_grid, month_marks, week_strip, DayMark};
pub use stats::streak::{best_streak, completion_rate, current_streak, is_completed_today};
pub use stats::HabitStats;

/// Minimal health-check API for bridge integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
