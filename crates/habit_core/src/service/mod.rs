//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model, statistics, persistence and adapters into use cases.
//! - Keep UI/FFI layers decoupled from storage and device details.

pub mod habit_service;
