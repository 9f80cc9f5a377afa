//! Device adapter contracts.
//!
//! # Responsibility
//! - Describe the health-data probe and reminder scheduler the service needs.
//! - Ship in-process implementations the host can feed or mirror.
//!
//! # Invariants
//! - A missing capability degrades to "no data" or "no reminder", never an abort.

pub mod capability;
pub mod health;
pub mod reminder;
