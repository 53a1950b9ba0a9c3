//! Bus events — what the transport reports, and how the reconciliation loop
//! reads an event name.

use serde::{Deserialize, Serialize};

use crate::id::DeviceIdentity;

/// Device families that appear in bus event names (`new<family>found`,
/// `existing<family>updated`, …).
const DEVICE_FAMILIES: [&str; 6] = ["lightchannel", "temp", "pir", "output", "button", "trigger"];

/// Families that fire `existing<family>triggered` events.
const TRIGGER_FAMILIES: [&str; 2] = ["pir", "trigger"];

/// Device fields carried by every bus event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: DeviceIdentity,
    /// Raw device-type code; see [`classify`](crate::category::classify).
    pub category_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub level: f64,
}

impl DeviceInfo {
    #[must_use]
    pub fn new(id: impl Into<DeviceIdentity>, category_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category_code: category_code.into(),
            name: String::new(),
            state: false,
            level: 0.0,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }
}

/// One event from the bus transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusEvent {
    pub name: String,
    pub device_info: DeviceInfo,
}

impl BusEvent {
    #[must_use]
    pub fn new(name: impl Into<String>, device_info: DeviceInfo) -> Self {
        Self {
            name: name.into(),
            device_info,
        }
    }

    /// Classify this event's name; see [`EventKind::classify`].
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::classify(&self.name)
    }
}

/// What an event means to the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A hub (`WebBrick` unit) was discovered for the first time.
    HubFound,
    /// A known hub reported in again.
    HubSeen,
    /// A device was discovered; it may or may not be known yet.
    DeviceFound,
    /// Periodic status for a device that should already be known.
    DeviceUpdated,
    /// A sensor fired (PIR motion, trigger input).
    SensorTriggered,
}

impl EventKind {
    /// Read an event name. Returns `None` for names the bridge does not act on.
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            "newwebbrickfound" => return Some(Self::HubFound),
            "existingwebbrickupdated" => return Some(Self::HubSeen),
            _ => {}
        }

        if let Some(family) = name
            .strip_prefix("new")
            .and_then(|rest| rest.strip_suffix("found"))
        {
            return DEVICE_FAMILIES
                .contains(&family)
                .then_some(Self::DeviceFound);
        }

        let rest = name.strip_prefix("existing")?;
        if let Some(family) = rest.strip_suffix("triggered") {
            return TRIGGER_FAMILIES
                .contains(&family)
                .then_some(Self::SensorTriggered);
        }
        let family = rest
            .strip_suffix("updated")
            .or_else(|| rest.strip_suffix("found"))?;
        DEVICE_FAMILIES
            .contains(&family)
            .then_some(Self::DeviceUpdated)
    }
}
