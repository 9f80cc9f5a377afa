use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};
use habit_core::{
    DisabledReminders, Habit, HabitService, HabitStore, HabitValidationError, HealthDataType,
    HealthDaySummary, HealthProbe, MemoryHabitStore, ReminderRegistry, ServiceError,
    SnapshotHealthProbe, StoreError, StoreResult,
};
use habit_core::db::DbError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 16, 9, 0, 0)
        .unwrap()
}

fn habit(name: &str) -> Habit {
    Habit::new(name, "star.fill", "FF9500")
}

fn linked(name: &str, data_type: HealthDataType) -> Habit {
    let mut value = habit(name);
    value.link_health(data_type);
    value
}

struct FailingStore;

impl HabitStore for FailingStore {
    fn load(&self) -> StoreResult<Vec<Habit>> {
        Err(StoreError::Decode(
            serde_json::from_str::<Vec<Habit>>("nope").unwrap_err(),
        ))
    }

    fn save(&self, _habits: &[Habit]) -> StoreResult<()> {
        Err(StoreError::Encode(
            serde_json::from_str::<Vec<Habit>>("nope").unwrap_err(),
        ))
    }
}

/// Store whose reads fail at the storage layer and whose saves are counted.
struct UnreachableStore {
    saves: AtomicUsize,
}

impl HabitStore for UnreachableStore {
    fn load(&self) -> StoreResult<Vec<Habit>> {
        Err(StoreError::Db(DbError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk unavailable",
        ))))
    }

    fn save(&self, _habits: &[Habit]) -> StoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Answers steps and panics on water.
struct PanickingWaterQuery;

impl HealthProbe for PanickingWaterQuery {
    fn is_authorized(&self) -> bool {
        true
    }

    fn check_today(&self, data_type: HealthDataType) -> bool {
        match data_type {
            HealthDataType::Water => panic!("health store crashed"),
            _ => true,
        }
    }
}

/// Probe answering `true` for every type and counting calls.
struct CountingProbe {
    calls: AtomicUsize,
    seen: Mutex<Vec<HealthDataType>>,
}

impl CountingProbe {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl HealthProbe for CountingProbe {
    fn is_authorized(&self) -> bool {
        true
    }

    fn check_today(&self, data_type: HealthDataType) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(data_type);
        true
    }
}

#[test]
fn undecodable_load_starts_empty_and_save_failure_is_ignored() {
    let mut service = HabitService::load(FailingStore, DisabledReminders).expect("load");
    assert!(service.habits().is_empty());

    let id = service.add(habit("Read")).unwrap();
    assert_eq!(service.toggle_completion(id, &now()), Some(true));
    assert!(service.delete(id));
}

#[test]
fn storage_read_failure_fails_load_without_saving() {
    let store = UnreachableStore {
        saves: AtomicUsize::new(0),
    };
    let err = HabitService::load(&store, DisabledReminders)
        .err()
        .expect("db error propagates");
    assert!(matches!(err, StoreError::Db(DbError::Io(_))));
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn mutations_are_persisted_and_reloaded() {
    let store = MemoryHabitStore::new();
    let id = {
        let mut service = HabitService::load(&store, DisabledReminders).expect("load");
        let id = service.add(habit("Read")).unwrap();
        service.toggle_completion(id, &now());
        service.set_notes(id, "ten pages");
        id
    };

    let service = HabitService::load(&store, DisabledReminders).expect("load");
    let loaded = service.get(id).expect("habit persisted");
    assert_eq!(loaded.completed_dates.len(), 1);
    assert_eq!(loaded.notes, "ten pages");
}

#[test]
fn corrupt_saved_document_loads_as_empty() {
    let store = MemoryHabitStore::with_payload("{broken");
    let service = HabitService::load(&store, DisabledReminders).expect("load");
    assert!(service.habits().is_empty());
}

#[test]
fn add_rejects_invalid_duplicate_and_used_records() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");

    let mut invalid = habit("Walk");
    invalid.is_health_linked = true;
    assert_eq!(
        service.add(invalid),
        Err(ServiceError::Validation(HabitValidationError::MissingHealthType))
    );

    let original = habit("Read");
    let id = service.add(original.clone()).unwrap();
    assert_eq!(service.add(original), Err(ServiceError::DuplicateId(id)));

    let mut used = habit("Run");
    used.completed_dates.push(now().with_timezone(&chrono::Utc));
    assert!(matches!(service.add(used), Err(ServiceError::HasCompletions(_))));
    assert_eq!(service.habits().len(), 1);
}

#[test]
fn delete_unknown_id_is_a_no_op() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    service.add(habit("Read")).unwrap();
    assert!(!service.delete(Uuid::new_v4()));
    assert_eq!(service.habits().len(), 1);
}

#[test]
fn toggle_twice_restores_state_and_removes_all_same_day_entries() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let id = service.add(habit("Read")).unwrap();

    assert_eq!(service.toggle_completion(id, &now()), Some(true));
    service.apply_health_result(id, true, &now());
    assert_eq!(service.toggle_completion(id, &now()), Some(false));
    assert!(service.get(id).unwrap().completed_dates.is_empty());

    assert_eq!(service.toggle_completion(Uuid::new_v4(), &now()), None);
}

#[test]
fn toggle_keeps_completions_from_other_days() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let id = service.add(habit("Read")).unwrap();
    let yesterday = now() - Duration::days(1);

    service.toggle_completion(id, &yesterday);
    service.toggle_completion(id, &now());
    service.toggle_completion(id, &now());

    let dates = &service.get(id).unwrap().completed_dates;
    assert_eq!(dates.len(), 1);
    assert_eq!(service.stats(id, &now()).unwrap().current_streak, 0);
}

#[test]
fn sync_completes_linked_habits_once_per_day() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let steps = service.add(linked("Walk", HealthDataType::Steps)).unwrap();
    let water = service.add(linked("Hydrate", HealthDataType::Water)).unwrap();
    let plain = service.add(habit("Read")).unwrap();

    let probe = CountingProbe::new();
    assert_eq!(service.sync_from_health_data(&now(), &probe), 2);
    assert_eq!(service.sync_from_health_data(&now(), &probe), 0);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
    assert!(!probe.seen.lock().unwrap().contains(&HealthDataType::Sleep));

    assert_eq!(service.get(steps).unwrap().completed_dates.len(), 1);
    assert_eq!(service.get(water).unwrap().completed_dates.len(), 1);
    assert!(service.get(plain).unwrap().completed_dates.is_empty());
}

#[test]
fn sync_applies_every_result_beyond_the_worker_limit() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let count = habit_core::MAX_CONCURRENT_HEALTH_QUERIES * 2 + 1;
    for i in 0..count {
        let data_type = HealthDataType::ALL[i % HealthDataType::ALL.len()];
        service.add(linked(&format!("habit {i}"), data_type)).unwrap();
    }

    let probe = CountingProbe::new();
    assert_eq!(service.sync_from_health_data(&now(), &probe), count);
    assert_eq!(probe.calls.load(Ordering::SeqCst), count);
}

#[test]
fn panicking_health_query_counts_as_not_met() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let steps = service.add(linked("Walk", HealthDataType::Steps)).unwrap();
    let water = service.add(linked("Hydrate", HealthDataType::Water)).unwrap();

    assert_eq!(service.sync_from_health_data(&now(), &PanickingWaterQuery), 1);
    assert_eq!(service.get(steps).unwrap().completed_dates.len(), 1);
    assert!(service.get(water).unwrap().completed_dates.is_empty());
}

#[test]
fn sync_skips_already_completed_and_unmet_goals() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let steps = service.add(linked("Walk", HealthDataType::Steps)).unwrap();
    let sleep = service.add(linked("Sleep", HealthDataType::Sleep)).unwrap();
    service.toggle_completion(steps, &now());

    let probe = SnapshotHealthProbe::new(
        HealthDaySummary {
            steps: 5_000.0,
            ..HealthDaySummary::default()
        },
        true,
    );
    assert_eq!(service.sync_from_health_data(&now(), &probe), 0);
    assert_eq!(service.get(steps).unwrap().completed_dates.len(), 1);
    assert!(service.get(sleep).unwrap().completed_dates.is_empty());
}

#[test]
fn sync_without_authorization_changes_nothing() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let id = service.add(linked("Walk", HealthDataType::Workout)).unwrap();

    let probe = SnapshotHealthProbe::new(
        HealthDaySummary {
            workout_samples: 3,
            ..HealthDaySummary::default()
        },
        false,
    );
    assert_eq!(service.sync_from_health_data(&now(), &probe), 0);
    assert!(service.get(id).unwrap().completed_dates.is_empty());
}

#[test]
fn health_result_for_deleted_habit_is_dropped() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let id = service.add(linked("Walk", HealthDataType::Steps)).unwrap();
    let targets = service.health_targets();
    assert_eq!(targets, vec![(id, HealthDataType::Steps)]);

    service.delete(id);
    assert!(!service.apply_health_result(id, true, &now()));
}

#[test]
fn reminders_follow_add_update_and_delete() {
    let registry = ReminderRegistry::new(true);
    let mut service = HabitService::load(MemoryHabitStore::new(), &registry).expect("load");

    let mut value = habit("Stretch");
    value.reminder_time = NaiveTime::from_hms_opt(8, 0, 0);
    value.is_reminder_enabled = true;
    let id = service.add(value).unwrap();
    assert_eq!(registry.get(id).map(|r| (r.hour, r.minute)), Some((8, 0)));

    assert!(service.set_reminder(id, NaiveTime::from_hms_opt(21, 15, 0)));
    assert_eq!(registry.get(id).map(|r| (r.hour, r.minute)), Some((21, 15)));

    assert!(service.set_reminder(id, None));
    assert!(registry.get(id).is_none());
    let stored = service.get(id).unwrap();
    assert!(!stored.is_reminder_enabled);
    assert_eq!(stored.reminder_time, NaiveTime::from_hms_opt(21, 15, 0));

    service.set_reminder(id, NaiveTime::from_hms_opt(6, 0, 0));
    service.delete(id);
    assert!(registry.snapshot().is_empty());
}

#[test]
fn reminder_without_notification_grant_still_saves_habit() {
    let registry = ReminderRegistry::new(false);
    let mut service = HabitService::load(MemoryHabitStore::new(), &registry).expect("load");
    let id = service.add(habit("Stretch")).unwrap();

    assert!(service.set_reminder(id, NaiveTime::from_hms_opt(8, 0, 0)));
    assert!(registry.snapshot().is_empty());
    assert!(service.get(id).unwrap().is_reminder_enabled);
    assert!(!service.set_reminder(Uuid::new_v4(), None));

    registry.set_authorized(true);
    assert!(service.set_reminder(id, NaiveTime::from_hms_opt(9, 30, 0)));
    assert_eq!(registry.get(id).map(|r| (r.hour, r.minute)), Some((9, 30)));
}

#[test]
fn sorted_by_priority_lists_high_first() {
    let mut service = HabitService::load(MemoryHabitStore::new(), DisabledReminders).expect("load");
    let mut low = habit("low");
    low.priority = habit_core::HabitPriority::Low;
    let mut high = habit("high");
    high.priority = habit_core::HabitPriority::High;
    service.add(low).unwrap();
    service.add(habit("medium")).unwrap();
    service.add(high).unwrap();

    let names: Vec<String> = service
        .sorted_by_priority()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["high", "medium", "low"]);
    assert_eq!(service.habits()[0].name, "low");
}
