//! Daily reminder scheduling contract.
//!
//! # Invariants
//! - Reminders are keyed by habit id; scheduling again replaces the old trigger.
//! - `update` always cancels before optionally scheduling.

use crate::adapter::capability::DeviceCapability;
use crate::model::habit::{Habit, HabitId};
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

const REMINDER_TITLE: &str = "Time for your habit! 🎯";

/// Repeating daily trigger for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderRequest {
    pub habit_id: HabitId,
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub body: String,
}

impl ReminderRequest {
    /// Builds the daily trigger for `habit` at `time` (seconds are dropped).
    pub fn daily(habit: &Habit, time: NaiveTime) -> Self {
        Self {
            habit_id: habit.id,
            hour: time.hour(),
            minute: time.minute(),
            title: REMINDER_TITLE.to_string(),
            body: format!("{} - don't forget to do it!", habit.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    CapabilityUnavailable(DeviceCapability),
    Rejected(String),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapabilityUnavailable(capability) => {
                write!(f, "capability not granted: {}", capability.as_str())
            }
            Self::Rejected(message) => write!(f, "reminder rejected: {message}"),
        }
    }
}

impl Error for ReminderError {}

/// Local notification scheduler.
pub trait ReminderScheduler {
    fn is_authorized(&self) -> bool;
    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError>;
    fn cancel(&self, habit_id: HabitId);

    /// Cancels the habit's trigger, then schedules `time` when present.
    fn update(&self, habit: &Habit, time: Option<NaiveTime>) -> Result<(), ReminderError> {
        self.cancel(habit.id);
        match time {
            Some(time) => self.schedule(&ReminderRequest::daily(habit, time)),
            None => Ok(()),
        }
    }
}

impl<T: ReminderScheduler + ?Sized> ReminderScheduler for &T {
    fn is_authorized(&self) -> bool {
        (**self).is_authorized()
    }

    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError> {
        (**self).schedule(request)
    }

    fn cancel(&self, habit_id: HabitId) {
        (**self).cancel(habit_id)
    }
}

impl<T: ReminderScheduler + ?Sized> ReminderScheduler for Arc<T> {
    fn is_authorized(&self) -> bool {
        (**self).is_authorized()
    }

    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError> {
        (**self).schedule(request)
    }

    fn cancel(&self, habit_id: HabitId) {
        (**self).cancel(habit_id)
    }
}

/// Scheduler for hosts without notification access.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledReminders;

impl ReminderScheduler for DisabledReminders {
    fn is_authorized(&self) -> bool {
        false
    }

    fn schedule(&self, _request: &ReminderRequest) -> Result<(), ReminderError> {
        Err(ReminderError::CapabilityUnavailable(
            DeviceCapability::Notifications,
        ))
    }

    fn cancel(&self, _habit_id: HabitId) {}
}

/// In-process reminder table mirrored by the host into OS notifications.
///
/// The notification grant can change while the process runs, so it is
/// tracked separately from the table and re-read on every `schedule`.
#[derive(Debug, Default)]
pub struct ReminderRegistry {
    authorized: AtomicBool,
    entries: Mutex<BTreeMap<HabitId, ReminderRequest>>,
}

impl ReminderRegistry {
    pub fn new(authorized: bool) -> Self {
        Self {
            authorized: AtomicBool::new(authorized),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Records the host's current notification grant.
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Scheduled reminders ordered by habit id.
    pub fn snapshot(&self) -> Vec<ReminderRequest> {
        self.entries().values().cloned().collect()
    }

    pub fn get(&self, habit_id: HabitId) -> Option<ReminderRequest> {
        self.entries().get(&habit_id).cloned()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<HabitId, ReminderRequest>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReminderScheduler for ReminderRegistry {
    fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError> {
        if !self.is_authorized() {
            return Err(ReminderError::CapabilityUnavailable(
                DeviceCapability::Notifications,
            ));
        }
        self.entries().insert(request.habit_id, request.clone());
        Ok(())
    }

    fn cancel(&self, habit_id: HabitId) {
        self.entries().remove(&habit_id);
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderError, ReminderRegistry, ReminderRequest, ReminderScheduler};
    use crate::model::habit::Habit;
    use chrono::NaiveTime;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 42).unwrap()
    }

    #[test]
    fn daily_request_uses_hour_and_minute() {
        let habit = Habit::new("Meditate", "leaf.fill", "34C759");
        let request = ReminderRequest::daily(&habit, at(7, 15));
        assert_eq!((request.hour, request.minute), (7, 15));
        assert!(request.body.starts_with("Meditate"));
        assert_eq!(request.habit_id, habit.id);
    }

    #[test]
    fn scheduling_same_habit_replaces_previous_trigger() {
        let registry = ReminderRegistry::new(true);
        let habit = Habit::new("Run", "figure.run", "FF3B30");

        registry.schedule(&ReminderRequest::daily(&habit, at(6, 0))).unwrap();
        registry.schedule(&ReminderRequest::daily(&habit, at(18, 30))).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].hour, 18);
    }

    #[test]
    fn update_without_time_cancels() {
        let registry = ReminderRegistry::new(true);
        let habit = Habit::new("Run", "figure.run", "FF3B30");
        registry.update(&habit, Some(at(6, 0))).unwrap();
        assert!(registry.get(habit.id).is_some());

        registry.update(&habit, None).unwrap();
        assert!(registry.get(habit.id).is_none());
    }

    #[test]
    fn unauthorized_registry_refuses_schedule() {
        let registry = ReminderRegistry::new(false);
        let habit = Habit::new("Run", "figure.run", "FF3B30");
        let err = registry.update(&habit, Some(at(6, 0))).unwrap_err();
        assert!(matches!(err, ReminderError::CapabilityUnavailable(_)));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn grant_given_after_creation_enables_schedule() {
        let registry = ReminderRegistry::new(false);
        let habit = Habit::new("Run", "figure.run", "FF3B30");
        assert!(registry.update(&habit, Some(at(6, 0))).is_err());

        registry.set_authorized(true);
        assert!(registry.is_authorized());
        registry.update(&habit, Some(at(6, 0))).unwrap();
        assert_eq!(registry.get(habit.id).map(|r| r.hour), Some(6));

        registry.set_authorized(false);
        assert!(!registry.is_authorized());
        registry.cancel(habit.id);
        assert!(registry.snapshot().is_empty());
    }
}
