//! Driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings the driver is started with.
///
/// A configuration that has not been `initialised` is replaced by the
/// defaults when the driver starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Installation name reported to the platform.
    pub name: String,
    /// Whether these settings were deliberately provided.
    pub initialised: bool,
    /// Number of devices expected on the bus; informational.
    pub number_of_devices: u32,
    /// Minutes between hub status polls.
    pub polling_minutes: u32,
    /// Whether the driver polls hub status periodically.
    pub polling_active: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: "PKHome".to_string(),
            initialised: false,
            number_of_devices: 0,
            polling_minutes: 5,
            polling_active: false,
        }
    }
}

impl DriverConfig {
    /// The settings the driver actually runs with.
    #[must_use]
    pub fn effective(self) -> Self {
        if self.initialised {
            self
        } else {
            Self::default()
        }
    }

    /// Interval between hub status polls, or `None` when polling is off.
    #[must_use]
    pub fn hub_poll_interval(&self) -> Option<Duration> {
        (self.polling_active && self.polling_minutes > 0)
            .then(|| Duration::from_secs(u64::from(self.polling_minutes) * 60))
    }
}
