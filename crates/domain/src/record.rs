//! Device record — one logical device, its identity, and the channels its
//! category grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{Capabilities, DeviceCategory, classify};
use crate::channel::ChannelKind;
use crate::error::ValidationError;
use crate::id::{DeviceIdentity, PlatformHandle};
use crate::name::sanitize;
use crate::notification::{Notification, NotificationKind};

/// UTC timestamp used for `last_seen`.
pub type Timestamp = DateTime<Utc>;

/// Manufacturer reported to the platform for every exported device.
pub const MANUFACTURER: &str = "WebBrick";

/// A logical device known to the bridge.
///
/// The category (and with it the channel set) is fixed at construction.
/// Channel mutators return the [`Notification`] to publish, or `None` when
/// the record lacks that channel.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    identity: DeviceIdentity,
    name: String,
    capabilities: Capabilities,
    platform_handle: Option<PlatformHandle>,
    last_seen: Timestamp,
}

impl DeviceRecord {
    /// Build a record from what the bus reported.
    ///
    /// An empty (or whitespace-only) `raw_name` falls back to the identity so
    /// no record ever has an empty display name.
    #[must_use]
    pub fn new(identity: DeviceIdentity, raw_name: &str, category_code: &str) -> Self {
        let (category, _) = classify(category_code);
        let name = if raw_name.trim().is_empty() {
            identity.to_string()
        } else {
            raw_name.to_string()
        };
        Self {
            identity,
            name,
            capabilities: Capabilities::for_category(category),
            platform_handle: None,
            last_seen: Utc::now(),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.capabilities.category()
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[must_use]
    pub fn supports(&self, kind: ChannelKind) -> bool {
        self.capabilities.has(kind)
    }

    /// Last known on/off state, if the record has an on/off channel that
    /// has seen a value.
    #[must_use]
    pub fn state(&self) -> Option<bool> {
        self.capabilities.on_off().and_then(|ch| ch.value())
    }

    /// Last known level: brightness for lights, reading for temperature
    /// sensors, `None` for every other category.
    #[must_use]
    pub fn level(&self) -> Option<f64> {
        self.capabilities
            .brightness()
            .and_then(|ch| ch.value())
            .or_else(|| self.capabilities.temperature().and_then(|ch| ch.value()))
    }

    /// Whether the record has been exported to the platform.
    #[must_use]
    pub fn is_onboarded(&self) -> bool {
        self.platform_handle.is_some()
    }

    pub fn mark_onboarded(&mut self, handle: PlatformHandle) {
        self.platform_handle = Some(handle);
    }

    pub fn touch(&mut self, at: Timestamp) {
        self.last_seen = at;
    }

    /// Replace the display name with what the bus reports now. Empty names
    /// are ignored.
    pub fn refresh_name(&mut self, raw_name: &str) {
        if !raw_name.trim().is_empty() {
            raw_name.clone_into(&mut self.name);
        }
    }

    pub fn send_on_off(&mut self, state: bool) -> Option<Notification> {
        let kind = self.capabilities.on_off_mut()?.send(state);
        Some(self.notification(kind))
    }

    /// Re-publish the cached on/off value. `None` if there is no channel or
    /// no value yet.
    pub fn resend_on_off(&mut self) -> Option<Notification> {
        let channel = self.capabilities.on_off_mut()?;
        let state = channel.value()?;
        let kind = channel.send(state);
        Some(self.notification(kind))
    }

    pub fn send_brightness(&mut self, level: f64) -> Option<Notification> {
        let kind = self.capabilities.brightness_mut()?.send(level);
        Some(self.notification(kind))
    }

    pub fn send_temperature(&mut self, celsius: f64) -> Option<Notification> {
        let kind = self.capabilities.temperature_mut()?.send(celsius);
        Some(self.notification(kind))
    }

    /// Motion pulse; leaves every stored value untouched.
    #[must_use]
    pub fn pulse_motion(&self) -> Option<Notification> {
        let kind = self.capabilities.motion()?.send();
        Some(self.notification(kind))
    }

    /// Sanitize `candidate` into a bus-legal name and adopt it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when nothing legal remains;
    /// the record is left unchanged.
    pub fn rename(&mut self, candidate: &str) -> Result<(String, Notification), ValidationError> {
        let safe = sanitize(candidate);
        if safe.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        safe.clone_into(&mut self.name);
        let notification = self.notification(NotificationKind::Renamed(safe.clone()));
        Ok((safe, notification))
    }

    /// What the platform needs to register this device.
    #[must_use]
    pub fn descriptor(&self) -> DeviceDescriptor {
        let category = self.category();
        DeviceDescriptor {
            natural_id: format!("device{}", self.identity),
            identity: self.identity.clone(),
            name: self.name.clone(),
            category,
            product_type: category.label(),
            manufacturer: MANUFACTURER,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            identity: self.identity.clone(),
            name: self.name.clone(),
            category: self.category(),
            channels: self.capabilities.kinds().to_vec(),
            state: self.state(),
            level: self.level(),
            onboarded: self.is_onboarded(),
            last_seen: self.last_seen,
        }
    }

    fn notification(&self, kind: NotificationKind) -> Notification {
        Notification::new(self.identity.clone(), kind)
    }
}

/// Device registration payload handed to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDescriptor {
    pub natural_id: String,
    pub identity: DeviceIdentity,
    pub name: String,
    pub category: DeviceCategory,
    pub product_type: &'static str,
    pub manufacturer: &'static str,
}

/// Read-only view of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub identity: DeviceIdentity,
    pub name: String,
    pub category: DeviceCategory,
    pub channels: Vec<ChannelKind>,
    pub state: Option<bool>,
    pub level: Option<f64>,
    pub onboarded: bool,
    pub last_seen: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> DeviceRecord {
        DeviceRecord::new("12".into(), "Kitchen", "lightchannel")
    }

    #[test]
    fn should_use_identity_when_name_is_empty() {
        let record = DeviceRecord::new("12".into(), "  ", "pir");
        assert_eq!(record.name(), "12");
    }

    #[test]
    fn should_build_inert_record_for_unknown_code() {
        let record = DeviceRecord::new("99".into(), "Mystery", "sprinkler");
        assert_eq!(record.category(), DeviceCategory::Unknown);
        assert!(record.capabilities().kinds().is_empty());
    }

    #[test]
    fn should_keep_category_after_construction() {
        let mut code = String::from("pir");
        let record = DeviceRecord::new("5".into(), "Hall", &code);
        code.clear();
        code.push_str("lightchannel");
        assert_eq!(record.category(), DeviceCategory::Motion);
        assert!(!record.supports(ChannelKind::Brightness));
    }

    #[test]
    fn should_start_without_state_or_level() {
        let record = light();
        assert_eq!(record.state(), None);
        assert_eq!(record.level(), None);
        assert!(!record.is_onboarded());
    }

    #[test]
    fn should_notify_and_store_when_on_off_sent() {
        let mut record = light();
        let n = record.send_on_off(true).unwrap();
        assert_eq!(n.kind, NotificationKind::OnOff(true));
        assert_eq!(n.identity, DeviceIdentity::from("12"));
        assert_eq!(record.state(), Some(true));
    }

    #[test]
    fn should_return_none_when_channel_missing() {
        let mut record = DeviceRecord::new("7".into(), "Temp", "temp");
        assert!(record.send_on_off(true).is_none());
        assert!(record.send_brightness(50.0).is_none());
        assert!(record.pulse_motion().is_none());
        assert_eq!(record.state(), None);
    }

    #[test]
    fn should_not_resend_unknown_on_off_state() {
        let mut record = light();
        assert!(record.resend_on_off().is_none());
        let _ = record.send_on_off(false);
        assert_eq!(
            record.resend_on_off().map(|n| n.kind),
            Some(NotificationKind::OnOff(false))
        );
    }

    #[test]
    fn should_report_temperature_as_level() {
        let mut record = DeviceRecord::new("t1".into(), "Lounge", "temp");
        let _ = record.send_temperature(19.5);
        assert_eq!(record.level(), Some(19.5));
    }

    #[test]
    fn should_pulse_motion_without_changing_state() {
        let record = DeviceRecord::new("p1".into(), "Hall", "pir");
        let n = record.pulse_motion().unwrap();
        assert_eq!(n.kind, NotificationKind::Motion);
        assert_eq!(record.state(), None);
        assert_eq!(record.level(), None);
    }

    #[test]
    fn should_sanitize_and_adopt_name_on_rename() {
        let mut record = light();
        let (safe, n) = record.rename("Living Room #1!").unwrap();
        assert_eq!(safe, "livingroom1");
        assert_eq!(record.name(), "livingroom1");
        assert_eq!(n.kind, NotificationKind::Renamed("livingroom1".to_string()));
    }

    #[test]
    fn should_reject_rename_that_sanitizes_to_nothing() {
        let mut record = light();
        assert_eq!(record.rename("!!!"), Err(ValidationError::EmptyName));
        assert_eq!(record.name(), "Kitchen");
    }

    #[test]
    fn should_ignore_empty_name_refresh() {
        let mut record = light();
        record.refresh_name("");
        assert_eq!(record.name(), "Kitchen");
        record.refresh_name("Scullery");
        assert_eq!(record.name(), "Scullery");
    }

    #[test]
    fn should_describe_device_for_platform() {
        let descriptor = light().descriptor();
        assert_eq!(descriptor.natural_id, "device12");
        assert_eq!(descriptor.product_type, "Light");
        assert_eq!(descriptor.manufacturer, "WebBrick");
    }

    #[test]
    fn should_snapshot_onboarding_and_channels() {
        let mut record = light();
        record.mark_onboarded(PlatformHandle::new());
        let _ = record.send_brightness(42.0);
        let snapshot = record.snapshot();
        assert!(snapshot.onboarded);
        assert_eq!(snapshot.channels, vec![ChannelKind::OnOff, ChannelKind::Brightness]);
        assert_eq!(snapshot.level, Some(42.0));
    }
}
