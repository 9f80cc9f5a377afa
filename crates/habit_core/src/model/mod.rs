//! Domain model for habit tracking.
//!
//! # Responsibility
//! - Define the canonical habit record persisted and rendered by every screen.
//! - Keep closed enumerations (priority, health data type) in one place.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - Completion timestamps are stored in append order and may repeat per day.

pub mod habit;
pub mod quote;
