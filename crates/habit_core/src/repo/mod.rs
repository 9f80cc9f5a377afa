//! Persistence adapters for the habit list.
//!
//! # Responsibility
//! - Define the whole-list load/save contract used by the service layer.
//! - Isolate SQLite and JSON details from business orchestration.

pub mod habit_store;
