//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record shared by list, detail, and sync flows.
//! - Provide validation for invariants the producing UI used to own.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - A health-linked habit always carries a `health_type`.
//! - An enabled reminder always carries a `reminder_time`.

use chrono::{DateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every habit.
pub type HabitId = Uuid;

static COLOR_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("valid color token regex"));

/// Device health signal a habit can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthDataType {
    Steps,
    Water,
    Sleep,
    Workout,
}

impl HealthDataType {
    pub const ALL: [HealthDataType; 4] = [Self::Steps, Self::Water, Self::Sleep, Self::Workout];

    /// Stable string id used across the bridge.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::Water => "water",
            Self::Sleep => "sleep",
            Self::Workout => "workout",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "steps" => Some(Self::Steps),
            "water" => Some(Self::Water),
            "sleep" => Some(Self::Sleep),
            "workout" => Some(Self::Workout),
            _ => None,
        }
    }

    /// Presentation icon token.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Steps => "figure.walk",
            Self::Water => "drop.fill",
            Self::Sleep => "bed.double.fill",
            Self::Workout => "figure.run",
        }
    }
}

/// Habit priority used for list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl HabitPriority {
    pub const ALL: [HabitPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort rank; lower ranks are listed first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Presentation color token (hex, no leading `#`).
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "34C759",
            Self::Medium => "FF9500",
            Self::High => "FF3B30",
        }
    }
}

/// Validation errors for habit invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    NilId,
    EmptyName,
    InvalidColor(String),
    MissingHealthType,
    ReminderWithoutTime,
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "habit id must not be nil"),
            Self::EmptyName => write!(f, "habit name must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "habit color must be a 6-digit hex token, got `{value}`")
            }
            Self::MissingHealthType => {
                write!(f, "health-linked habit requires a health_type")
            }
            Self::ReminderWithoutTime => {
                write!(f, "enabled reminder requires a reminder_time")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Presentation-only icon token.
    pub icon: String,
    /// Presentation-only hex color token.
    pub color: String,
    /// Append order, not necessarily chronological.
    pub completed_dates: Vec<DateTime<Utc>>,
    pub is_health_linked: bool,
    pub health_type: Option<HealthDataType>,
    #[serde(default)]
    pub priority: HabitPriority,
    #[serde(default)]
    pub notes: String,
    /// Local time-of-day for the daily reminder.
    pub reminder_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_reminder_enabled: bool,
}

impl Habit {
    /// Creates a habit with a generated id and no completions.
    pub fn new(name: impl Into<String>, icon: impl Into<String>, color: impl Into<String>) -> Self {
        Self::build(Uuid::new_v4(), name.into(), icon.into(), color.into())
    }

    /// Creates a habit with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(
        id: HabitId,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, HabitValidationError> {
        if id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        Ok(Self::build(id, name.into(), icon.into(), color.into()))
    }

    fn build(id: HabitId, name: String, icon: String, color: String) -> Self {
        Self {
            id,
            name,
            icon,
            color,
            completed_dates: Vec::new(),
            is_health_linked: false,
            health_type: None,
            priority: HabitPriority::default(),
            notes: String::new(),
            reminder_time: None,
            is_reminder_enabled: false,
        }
    }

    /// Links this habit to a health signal.
    pub fn link_health(&mut self, data_type: HealthDataType) {
        self.is_health_linked = true;
        self.health_type = Some(data_type);
    }

    /// Returns the linked data type when the link is complete.
    pub fn health_link(&self) -> Option<HealthDataType> {
        if self.is_health_linked {
            self.health_type
        } else {
            None
        }
    }

    /// Returns the reminder time when reminders are active for this habit.
    pub fn active_reminder(&self) -> Option<NaiveTime> {
        if self.is_reminder_enabled {
            self.reminder_time
        } else {
            None
        }
    }

    /// Validates record invariants.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        if !COLOR_TOKEN_RE.is_match(self.color.trim_start_matches('#')) {
            return Err(HabitValidationError::InvalidColor(self.color.clone()));
        }
        if self.is_health_linked && self.health_type.is_none() {
            return Err(HabitValidationError::MissingHealthType);
        }
        if self.is_reminder_enabled && self.reminder_time.is_none() {
            return Err(HabitValidationError::ReminderWithoutTime);
        }
        Ok(())
    }
}

/// Stable sort with high priority first; equal priorities keep list order.
pub fn sort_by_priority(habits: &mut [Habit]) {
    habits.sort_by_key(|habit| habit.priority.rank());
}
