//! Habit collection use-case service.
//!
//! # Responsibility
//! - Own the in-memory habit list and every mutation of it.
//! - Persist the full list after each mutation and drive the device adapters.
//!
//! # Invariants
//! - Mutations only happen through `&mut self`, so they are serialized.
//! - Health results are applied by habit id at apply time, never by index.
//! - Sync appends at most one completion per habit per local day.
//! - Save and adapter failures degrade to logged warnings.
//! - A load that cannot reach storage fails instead of starting empty, so a
//!   later save can never overwrite the saved list with a truncated one.

use crate::adapter::health::{probe_today, HealthProbe};
use crate::adapter::reminder::ReminderScheduler;
use crate::model::habit::{sort_by_priority, Habit, HabitId, HabitValidationError, HealthDataType};
use crate::repo::habit_store::{HabitStore, StoreError, StoreResult};
use crate::stats::streak::{is_completed_today, local_day};
use crate::stats::HabitStats;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread;

/// Upper bound on health queries in flight during one sync.
pub const MAX_CONCURRENT_HEALTH_QUERIES: usize = 4;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Validation(HabitValidationError),
    DuplicateId(HabitId),
    /// New habits must start without completions.
    HasCompletions(HabitId),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "habit already exists: {id}"),
            Self::HasCompletions(id) => write!(f, "new habit {id} must not carry completions"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::DuplicateId(_) | Self::HasCompletions(_) => None,
        }
    }
}

impl From<HabitValidationError> for ServiceError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Single owner of the habit collection.
pub struct HabitService<S: HabitStore, N: ReminderScheduler> {
    habits: Vec<Habit>,
    store: S,
    reminders: N,
}

impl<S: HabitStore, N: ReminderScheduler> HabitService<S, N> {
    /// Loads the saved list; a missing or undecodable document starts empty.
    ///
    /// # Errors
    /// - `StoreError::Db` when storage itself could not be read.
    pub fn load(store: S, reminders: N) -> StoreResult<Self> {
        let habits = match store.load() {
            Ok(habits) => {
                info!(
                    "event=habits_load module=service status=ok count={}",
                    habits.len()
                );
                habits
            }
            Err(StoreError::Db(err)) => {
                warn!("event=habits_load module=service status=error error={err}");
                return Err(StoreError::Db(err));
            }
            Err(err) => {
                warn!("event=habits_load module=service status=degraded fallback=empty error={err}");
                Vec::new()
            }
        };

        Ok(Self {
            habits,
            store,
            reminders,
        })
    }

    /// Habits in insertion order.
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    /// Habits ordered for the list screen, high priority first.
    pub fn sorted_by_priority(&self) -> Vec<Habit> {
        let mut habits = self.habits.clone();
        sort_by_priority(&mut habits);
        habits
    }

    /// Adds a freshly created habit and schedules its reminder.
    ///
    /// # Errors
    /// - `Validation` when the record breaks a model invariant.
    /// - `DuplicateId` when the id is already in the collection.
    /// - `HasCompletions` when the record is not fresh.
    pub fn add(&mut self, habit: Habit) -> ServiceResult<HabitId> {
        habit.validate()?;
        if self.get(habit.id).is_some() {
            return Err(ServiceError::DuplicateId(habit.id));
        }
        if !habit.completed_dates.is_empty() {
            return Err(ServiceError::HasCompletions(habit.id));
        }

        let id = habit.id;
        if let Some(time) = habit.active_reminder() {
            self.sync_reminder(&habit, Some(time));
        }
        self.habits.push(habit);
        info!("event=habit_add module=service status=ok habit_id={id}");
        self.persist();
        Ok(id)
    }

    /// Removes a habit and its reminder. Returns `false` when absent.
    pub fn delete(&mut self, id: HabitId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return false;
        }

        self.reminders.cancel(id);
        info!("event=habit_delete module=service status=ok habit_id={id}");
        self.persist();
        true
    }

    /// Flips today's completion and returns the new state.
    ///
    /// Un-completing removes every timestamp on `now`'s local day.
    /// Returns `None` when the habit does not exist.
    pub fn toggle_completion<Tz: TimeZone>(
        &mut self,
        id: HabitId,
        now: &DateTime<Tz>,
    ) -> Option<bool> {
        let habit = self.habits.iter_mut().find(|habit| habit.id == id)?;
        let completed = if is_completed_today(&habit.completed_dates, now) {
            let tz = now.timezone();
            let today = now.date_naive();
            habit
                .completed_dates
                .retain(|instant| local_day(instant, &tz) != today);
            false
        } else {
            habit.completed_dates.push(now.with_timezone(&Utc));
            true
        };

        debug!("event=habit_toggle module=service status=ok habit_id={id} completed={completed}");
        self.persist();
        Some(completed)
    }

    /// Enables the daily reminder at `time`, or disables it with `None`.
    ///
    /// The last chosen time is kept when disabling so the picker can reuse it.
    /// Returns `false` when the habit does not exist.
    pub fn set_reminder(&mut self, id: HabitId, time: Option<NaiveTime>) -> bool {
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            return false;
        };
        if let Some(time) = time {
            habit.reminder_time = Some(time);
        }
        habit.is_reminder_enabled = time.is_some();

        let snapshot = habit.clone();
        self.sync_reminder(&snapshot, time);
        self.persist();
        true
    }

    /// Replaces free-text notes. Returns `false` when the habit does not exist.
    pub fn set_notes(&mut self, id: HabitId, notes: impl Into<String>) -> bool {
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            return false;
        };
        habit.notes = notes.into();
        self.persist();
        true
    }

    /// Health-linked habits and the data type each one watches.
    pub fn health_targets(&self) -> Vec<(HabitId, HealthDataType)> {
        self.habits
            .iter()
            .filter_map(|habit| habit.health_link().map(|data_type| (habit.id, data_type)))
            .collect()
    }

    /// Applies one probe result; appends `now` when `met` and not yet completed.
    ///
    /// Returns whether a completion was appended. Unknown ids are ignored,
    /// so results for habits deleted mid-sync are dropped.
    pub fn apply_health_result<Tz: TimeZone>(
        &mut self,
        id: HabitId,
        met: bool,
        now: &DateTime<Tz>,
    ) -> bool {
        if !met {
            return false;
        }
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            debug!("event=health_apply module=service status=skipped reason=missing habit_id={id}");
            return false;
        };
        if is_completed_today(&habit.completed_dates, now) {
            return false;
        }

        habit.completed_dates.push(now.with_timezone(&Utc));
        info!("event=health_apply module=service status=ok habit_id={id}");
        self.persist();
        true
    }

    /// Probes every health-linked habit and auto-completes those that met today's goal.
    ///
    /// Queries run on at most `MAX_CONCURRENT_HEALTH_QUERIES` worker threads;
    /// their results are applied one at a time on the calling thread. A query
    /// that panics counts as "not met". Returns how many completions were
    /// appended.
    pub fn sync_from_health_data<Tz, P>(&mut self, now: &DateTime<Tz>, probe: &P) -> usize
    where
        Tz: TimeZone,
        P: HealthProbe + ?Sized,
    {
        let targets = self.health_targets();
        if targets.is_empty() {
            return 0;
        }
        if !probe.is_authorized() {
            info!("event=health_sync module=service status=degraded capability=health_data");
            return 0;
        }

        let workers = targets.len().min(MAX_CONCURRENT_HEALTH_QUERIES);
        let queue = Mutex::new(targets.into_iter());
        let (tx, rx) = mpsc::channel();
        let mut applied = 0;
        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .next();
                    let Some((id, data_type)) = next else {
                        break;
                    };
                    let query = AssertUnwindSafe(|| probe_today(probe, data_type));
                    let met = panic::catch_unwind(query).unwrap_or_else(|_| {
                        warn!(
                            "event=health_query module=service status=failed habit_id={id} data_type={}",
                            data_type.as_str()
                        );
                        false
                    });
                    if tx.send((id, met)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (id, met) in rx {
                if self.apply_health_result(id, met, now) {
                    applied += 1;
                }
            }
        });

        info!("event=health_sync module=service status=ok applied={applied}");
        applied
    }

    /// Statistics for one habit at `now`.
    pub fn stats<Tz: TimeZone>(&self, id: HabitId, now: &DateTime<Tz>) -> Option<HabitStats> {
        self.get(id).map(|habit| HabitStats::compute(habit, now))
    }

    fn sync_reminder(&self, habit: &Habit, time: Option<NaiveTime>) {
        let time = match time {
            Some(_) if !self.reminders.is_authorized() => {
                info!(
                    "event=reminder_update module=service status=degraded capability=notifications habit_id={}",
                    habit.id
                );
                None
            }
            time => time,
        };
        if let Err(err) = self.reminders.update(habit, time) {
            warn!(
                "event=reminder_update module=service status=degraded habit_id={} error={err}",
                habit.id
            );
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.habits) {
            warn!("event=habits_save module=service status=dropped error={err}");
        }
    }
}
