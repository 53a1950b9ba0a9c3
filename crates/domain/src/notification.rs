//! Outward notifications — what the platform is told after a channel `send`
//! or a rename.

use serde::{Deserialize, Serialize};

use crate::id::DeviceIdentity;

/// Payload of a [`Notification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NotificationKind {
    OnOff(bool),
    Brightness(f64),
    /// Edge-triggered pulse; carries no value.
    Motion,
    Temperature(f64),
    Renamed(String),
}

/// A change the platform must observe, addressed by bus identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub identity: DeviceIdentity,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

impl Notification {
    #[must_use]
    pub fn new(identity: DeviceIdentity, kind: NotificationKind) -> Self {
        Self { identity, kind }
    }
}
