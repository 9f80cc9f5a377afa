//! Health-data probe contract and daily thresholds.

use crate::model::habit::HealthDataType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Step count that must be exceeded for a steps habit.
pub const STEPS_THRESHOLD: f64 = 1000.0;
/// Water volume in milliliters that must be exceeded for a water habit.
pub const WATER_THRESHOLD_ML: f64 = 500.0;

/// Aggregated health samples for the current local day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthDaySummary {
    pub steps: f64,
    pub water_ml: f64,
    pub sleep_samples: u32,
    pub workout_samples: u32,
}

impl HealthDataType {
    /// Returns whether `summary` satisfies today's goal for this data type.
    pub fn is_met(self, summary: &HealthDaySummary) -> bool {
        match self {
            Self::Steps => summary.steps > STEPS_THRESHOLD,
            Self::Water => summary.water_ml > WATER_THRESHOLD_ML,
            Self::Sleep => summary.sleep_samples > 0,
            Self::Workout => summary.workout_samples > 0,
        }
    }
}

/// Read-only access to today's device health data.
///
/// Probes may be called from several threads at once.
pub trait HealthProbe: Send + Sync {
    /// Whether the user granted health-data read access.
    fn is_authorized(&self) -> bool;
    /// Whether today's goal for `data_type` was reached.
    fn check_today(&self, data_type: HealthDataType) -> bool;
}

impl<T: HealthProbe + ?Sized> HealthProbe for &T {
    fn is_authorized(&self) -> bool {
        (**self).is_authorized()
    }

    fn check_today(&self, data_type: HealthDataType) -> bool {
        (**self).check_today(data_type)
    }
}

impl<T: HealthProbe + ?Sized> HealthProbe for Arc<T> {
    fn is_authorized(&self) -> bool {
        (**self).is_authorized()
    }

    fn check_today(&self, data_type: HealthDataType) -> bool {
        (**self).check_today(data_type)
    }
}

/// Probes `data_type`, treating a missing grant as "no data".
pub fn probe_today<P: HealthProbe + ?Sized>(probe: &P, data_type: HealthDataType) -> bool {
    probe.is_authorized() && probe.check_today(data_type)
}

/// Probe answering from a summary the host already aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapshotHealthProbe {
    summary: HealthDaySummary,
    authorized: bool,
}

impl SnapshotHealthProbe {
    pub fn new(summary: HealthDaySummary, authorized: bool) -> Self {
        Self {
            summary,
            authorized,
        }
    }

    /// Probe for a device where access was never granted.
    pub fn unauthorized() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &HealthDaySummary {
        &self.summary
    }
}

impl HealthProbe for SnapshotHealthProbe {
    fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn check_today(&self, data_type: HealthDataType) -> bool {
        data_type.is_met(&self.summary)
    }
}
