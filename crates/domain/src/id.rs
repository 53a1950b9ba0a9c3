//! Identifiers: bus-assigned device identities and platform handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the bus to one physical device.
///
/// The bus reports identifiers either as text or as numbers; numbers are
/// kept as their decimal text so both forms compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for DeviceIdentity {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// Handle returned by the platform when a device is exported to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformHandle(uuid::Uuid);

impl Default for PlatformHandle {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl PlatformHandle {
    /// Generate a new random handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for PlatformHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
