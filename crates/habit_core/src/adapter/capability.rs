//! Device capabilities that require a one-time user grant.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceCapability {
    HealthData,
    Notifications,
}

/// Bridge string for the health-data capability.
pub const DEVICE_CAPABILITY_HEALTH_DATA: &str = "health_data";
/// Bridge string for the notifications capability.
pub const DEVICE_CAPABILITY_NOTIFICATIONS: &str = "notifications";

impl DeviceCapability {
    pub const ALL: [DeviceCapability; 2] = [Self::HealthData, Self::Notifications];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HealthData => DEVICE_CAPABILITY_HEALTH_DATA,
            Self::Notifications => DEVICE_CAPABILITY_NOTIFICATIONS,
        }
    }

    /// User-facing permission rationale.
    pub fn description(self) -> &'static str {
        match self {
            Self::HealthData => {
                "Read today's steps, water, sleep and workouts to complete linked habits."
            }
            Self::Notifications => "Post a daily local notification for habit reminders.",
        }
    }
}
