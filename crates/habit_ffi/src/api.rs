//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core types into flat, string-friendly records.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Collection mutations are serialized through one process-wide lock.
//! - Times cross the boundary as local `HH:MM` strings.

use chrono::{Local, NaiveTime};
use habit_core::db::open_db;
use habit_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    month_marks, ping as ping_inner, quote_for_day, week_strip, DeviceCapability, Habit, HabitId,
    HabitPriority, HabitService, HabitStats, HealthDataType, HealthDaySummary, ReminderRegistry,
    ReminderRequest, ReminderScheduler, SnapshotHealthProbe, SqliteHabitStore,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "habit_tracker.sqlite3";
const DB_PATH_ENV: &str = "HABIT_DB_PATH";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REMINDERS: OnceLock<ReminderRegistry> = OnceLock::new();
static SERVICE_LOCK: Mutex<()> = Mutex::new(());

type BridgeService<'conn> = HabitService<SqliteHabitStore<'conn>, &'static ReminderRegistry>;

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// An empty `level` selects the build's default level.
/// Returns an empty string on success and the error message otherwise.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        other => other,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Habit row for list and detail screens.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitItem {
    pub habit_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// `low|medium|high`.
    pub priority: String,
    /// Hex badge color of the priority.
    pub priority_color: String,
    /// `steps|water|sleep|workout` when health-linked.
    pub health_type: Option<String>,
    /// Symbol name of the linked health source.
    pub health_icon: Option<String>,
    pub notes: String,
    /// Local `HH:MM`.
    pub reminder_time: Option<String>,
    pub reminder_enabled: bool,
    pub completed_today: bool,
    pub current_streak: u32,
    pub best_streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
}

/// Input for creating one habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub priority: String,
    pub health_type: Option<String>,
    pub notes: String,
    pub reminder_time: Option<String>,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    pub ok: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

impl HabitActionResponse {
    fn success(message: impl Into<String>, habit_id: Option<String>) -> Self {
        Self {
            ok: true,
            habit_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            habit_id: None,
            message: message.into(),
        }
    }
}

/// One cell of the month calendar; `day` is `None` for leading blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub day: Option<u32>,
    pub completed: bool,
    pub is_today: bool,
}

/// One bar of the week chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDayItem {
    pub label: String,
    pub completed: bool,
    pub is_today: bool,
}

/// Reminder the host mirrors into an OS notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub habit_id: String,
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub body: String,
}

/// Permission the host asks for, with its rationale text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityItem {
    /// `health_data|notifications`.
    pub capability: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteItem {
    pub text: String,
    pub author: String,
}

/// Lists habits ordered by priority with today's statistics.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_list() -> Vec<HabitItem> {
    let now = Local::now();
    match with_habit_service(|service| {
        service
            .sorted_by_priority()
            .iter()
            .map(|habit| to_habit_item(habit, &HabitStats::compute(habit, &now)))
            .collect::<Vec<_>>()
    }) {
        Ok(items) => items,
        Err(err) => {
            warn!("event=ffi_call module=ffi call=habit_list status=error error={err}");
            Vec::new()
        }
    }
}

/// Creates a habit from the add-habit form.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_create(draft: HabitDraft) -> HabitActionResponse {
    let habit = match habit_from_draft(draft) {
        Ok(habit) => habit,
        Err(message) => return HabitActionResponse::failure(format!("habit_create failed: {message}")),
    };
    match with_habit_service(|service| service.add(habit).map_err(|err| err.to_string())) {
        Ok(Ok(id)) => HabitActionResponse::success("Habit created.", Some(id.to_string())),
        Ok(Err(err)) | Err(err) => HabitActionResponse::failure(format!("habit_create failed: {err}")),
    }
}

/// Deletes a habit; deleting an unknown id still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(habit_id: String) -> HabitActionResponse {
    let id = match parse_habit_id(&habit_id) {
        Ok(id) => id,
        Err(message) => return HabitActionResponse::failure(message),
    };
    match with_habit_service(|service| service.delete(id)) {
        Ok(true) => HabitActionResponse::success("Habit deleted.", Some(habit_id)),
        Ok(false) => HabitActionResponse::success("Habit already absent.", None),
        Err(err) => HabitActionResponse::failure(format!("habit_delete failed: {err}")),
    }
}

/// Toggles today's completion.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_toggle(habit_id: String) -> HabitActionResponse {
    let id = match parse_habit_id(&habit_id) {
        Ok(id) => id,
        Err(message) => return HabitActionResponse::failure(message),
    };
    let now = Local::now();
    match with_habit_service(|service| service.toggle_completion(id, &now)) {
        Ok(Some(true)) => HabitActionResponse::success("Completed today.", Some(habit_id)),
        Ok(Some(false)) => HabitActionResponse::success("Marked not done today.", Some(habit_id)),
        Ok(None) => HabitActionResponse::failure(format!("habit not found: {habit_id}")),
        Err(err) => HabitActionResponse::failure(format!("habit_toggle failed: {err}")),
    }
}

/// Sets (`Some("HH:MM")`) or clears (`None`) the daily reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_set_reminder(habit_id: String, time: Option<String>) -> HabitActionResponse {
    let id = match parse_habit_id(&habit_id) {
        Ok(id) => id,
        Err(message) => return HabitActionResponse::failure(message),
    };
    let time = match time.as_deref().map(parse_time_of_day).transpose() {
        Ok(time) => time,
        Err(message) => return HabitActionResponse::failure(message),
    };
    match with_habit_service(|service| service.set_reminder(id, time)) {
        Ok(true) => HabitActionResponse::success("Reminder updated.", Some(habit_id)),
        Ok(false) => HabitActionResponse::failure(format!("habit not found: {habit_id}")),
        Err(err) => HabitActionResponse::failure(format!("habit_set_reminder failed: {err}")),
    }
}

/// Applies today's aggregated health samples to linked habits.
///
/// The host queries the device health store and passes the totals here.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_sync_health(
    steps: f64,
    water_ml: f64,
    sleep_samples: u32,
    workout_samples: u32,
    authorized: bool,
) -> HabitActionResponse {
    let probe = SnapshotHealthProbe::new(
        HealthDaySummary {
            steps,
            water_ml,
            sleep_samples,
            workout_samples,
        },
        authorized,
    );
    let now = Local::now();
    match with_habit_service(|service| service.sync_from_health_data(&now, &probe)) {
        Ok(applied) => {
            HabitActionResponse::success(format!("Auto-completed {applied} habit(s)."), None)
        }
        Err(err) => HabitActionResponse::failure(format!("habit_sync_health failed: {err}")),
    }
}

/// Month calendar for one habit; empty when the habit is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_calendar(habit_id: String) -> Vec<CalendarCell> {
    let now = Local::now();
    with_habit(&habit_id, |habit| {
        month_marks(&habit.completed_dates, &now)
            .into_iter()
            .map(|cell| match cell {
                Some(mark) => CalendarCell {
                    day: Some(chrono::Datelike::day(&mark.date)),
                    completed: mark.completed,
                    is_today: mark.is_today,
                },
                None => CalendarCell {
                    day: None,
                    completed: false,
                    is_today: false,
                },
            })
            .collect()
    })
}

/// Last seven days for one habit; empty when the habit is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_week(habit_id: String) -> Vec<WeekDayItem> {
    let now = Local::now();
    with_habit(&habit_id, |habit| {
        week_strip(&habit.completed_dates, &now)
            .into_iter()
            .map(|mark| WeekDayItem {
                label: mark.label,
                completed: mark.completed,
                is_today: mark.is_today,
            })
            .collect()
    })
}

/// Records the notification grant and re-registers every enabled reminder.
///
/// Call after the host asked for notification permission, and again whenever
/// the grant changes. Returns the reminders to mirror.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_init(authorized: bool) -> Vec<ReminderItem> {
    let registry = reminder_registry();
    registry.set_authorized(authorized);
    let restored = with_habit_service(|service| {
        for habit in service.habits() {
            if let Some(time) = habit.active_reminder() {
                if let Err(err) = registry.schedule(&ReminderRequest::daily(habit, time)) {
                    warn!(
                        "event=reminder_restore module=ffi status=degraded habit_id={} error={err}",
                        habit.id
                    );
                }
            }
        }
    });
    if let Err(err) = restored {
        warn!("event=ffi_call module=ffi call=reminders_init status=error error={err}");
    }
    reminders_snapshot()
}

/// Currently scheduled reminders.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_snapshot() -> Vec<ReminderItem> {
    reminder_registry()
        .snapshot()
        .into_iter()
        .map(|request| ReminderItem {
            habit_id: request.habit_id.to_string(),
            hour: request.hour,
            minute: request.minute,
            title: request.title,
            body: request.body,
        })
        .collect()
}

/// Capabilities the host requests, for the permission screen.
#[flutter_rust_bridge::frb(sync)]
pub fn device_capabilities() -> Vec<CapabilityItem> {
    DeviceCapability::ALL
        .into_iter()
        .map(|capability| CapabilityItem {
            capability: capability.as_str().to_string(),
            description: capability.description().to_string(),
        })
        .collect()
}

/// Quote for today's home screen card.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_quote() -> QuoteItem {
    let quote = quote_for_day(Local::now().date_naive());
    QuoteItem {
        text: quote.text.to_string(),
        author: quote.author.to_string(),
    }
}

fn habit_from_draft(draft: HabitDraft) -> Result<Habit, String> {
    let mut habit = Habit::new(draft.name.trim(), draft.icon.trim(), draft.color.trim());
    habit.priority = HabitPriority::parse(&draft.priority)
        .ok_or_else(|| format!("unsupported priority `{}`", draft.priority))?;
    if let Some(raw) = draft.health_type.as_deref() {
        let data_type = HealthDataType::parse(raw)
            .ok_or_else(|| format!("unsupported health type `{raw}`"))?;
        habit.link_health(data_type);
    }
    habit.notes = draft.notes;
    if let Some(raw) = draft.reminder_time.as_deref() {
        habit.reminder_time = Some(parse_time_of_day(raw)?);
        habit.is_reminder_enabled = true;
    }
    Ok(habit)
}

fn to_habit_item(habit: &Habit, stats: &HabitStats) -> HabitItem {
    HabitItem {
        habit_id: habit.id.to_string(),
        name: habit.name.clone(),
        icon: habit.icon.clone(),
        color: habit.color.clone(),
        priority: habit.priority.as_str().to_string(),
        priority_color: habit.priority.color().to_string(),
        health_type: habit.health_link().map(|t| t.as_str().to_string()),
        health_icon: habit.health_link().map(|t| t.icon().to_string()),
        notes: habit.notes.clone(),
        reminder_time: habit.reminder_time.map(|t| t.format("%H:%M").to_string()),
        reminder_enabled: habit.is_reminder_enabled,
        completed_today: stats.completed_today,
        current_streak: stats.current_streak,
        best_streak: stats.best_streak,
        completion_rate: stats.completion_rate,
        total_completions: u32::try_from(stats.total_completions).unwrap_or(u32::MAX),
    }
}

fn parse_habit_id(raw: &str) -> Result<HabitId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid habit id `{raw}`"))
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| format!("invalid time `{raw}`; expected HH:MM"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn reminder_registry() -> &'static ReminderRegistry {
    REMINDERS.get_or_init(|| ReminderRegistry::new(false))
}

fn with_habit_service<T>(f: impl FnOnce(&mut BridgeService<'_>) -> T) -> Result<T, String> {
    let _guard = SERVICE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_db_path()).map_err(|err| format!("habit DB open failed: {err}"))?;
    let mut service = HabitService::load(SqliteHabitStore::new(&conn), reminder_registry())
        .map_err(|err| format!("habit list read failed: {err}"))?;
    Ok(f(&mut service))
}

fn with_habit<T: Default>(raw_id: &str, f: impl FnOnce(&Habit) -> T) -> T {
    let Ok(id) = parse_habit_id(raw_id) else {
        return T::default();
    };
    with_habit_service(|service| service.get(id).map(f).unwrap_or_default()).unwrap_or_default()
}
