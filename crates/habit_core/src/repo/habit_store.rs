//! Habit list persistence.
//!
//! # Responsibility
//! - Load and save the full habit list as one JSON document.
//! - Keep SQL and encoding details behind the `HabitStore` contract.
//!
//! # Invariants
//! - The document lives under the single key `HABITS_STORAGE_KEY`.
//! - A missing document loads as an empty list.

use crate::db::DbError;
use crate::model::habit::Habit;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Fixed storage key of the persisted habit list.
pub const HABITS_STORAGE_KEY: &str = "habits";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "stored habit list is unreadable: {err}"),
            Self::Encode(err) => write!(f, "habit list could not be encoded: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-list persistence contract.
pub trait HabitStore {
    /// Returns the saved list, or an empty list when nothing was saved yet.
    fn load(&self) -> StoreResult<Vec<Habit>>;
    /// Replaces the saved list.
    fn save(&self, habits: &[Habit]) -> StoreResult<()>;
}

impl<T: HabitStore + ?Sized> HabitStore for &T {
    fn load(&self) -> StoreResult<Vec<Habit>> {
        (**self).load()
    }

    fn save(&self, habits: &[Habit]) -> StoreResult<()> {
        (**self).save(habits)
    }
}

/// SQLite-backed store using the `kv_store` table.
pub struct SqliteHabitStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HabitStore for SqliteHabitStore<'_> {
    fn load(&self) -> StoreResult<Vec<Habit>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [HABITS_STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => decode(&json),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, habits: &[Habit]) -> StoreResult<()> {
        let json = encode(habits)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![HABITS_STORAGE_KEY, json],
        )?;
        debug!(
            "event=habits_save module=repo status=ok count={} bytes={}",
            habits.len(),
            json.len()
        );
        Ok(())
    }
}

/// In-process store holding the encoded document.
///
/// Encodes on every save so tests exercise the same wire shape as SQLite.
#[derive(Debug, Default)]
pub struct MemoryHabitStore {
    payload: Mutex<Option<String>>,
}

impl MemoryHabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw document, valid or not.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    /// Returns the last saved raw document.
    pub fn payload(&self) -> Option<String> {
        let guard = self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }
}

impl HabitStore for MemoryHabitStore {
    fn load(&self) -> StoreResult<Vec<Habit>> {
        match self.payload() {
            Some(json) => decode(&json),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, habits: &[Habit]) -> StoreResult<()> {
        let json = encode(habits)?;
        let mut guard = self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(json);
        Ok(())
    }
}

fn encode(habits: &[Habit]) -> StoreResult<String> {
    serde_json::to_string(habits).map_err(StoreError::Encode)
}

fn decode(json: &str) -> StoreResult<Vec<Habit>> {
    serde_json::from_str(json).map_err(StoreError::Decode)
}
