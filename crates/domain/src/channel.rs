//! Capability channels — the typed facets a device exposes to the platform.
//!
//! Every channel keeps its own last value. `set` stores a value silently;
//! `send` stores it and returns the [`NotificationKind`] the caller must
//! publish. Motion is edge-triggered and has no stored value, so it only
//! offers `send`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notification::NotificationKind;

/// Names a channel as the platform knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "on-off")]
    OnOff,
    #[serde(rename = "brightness")]
    Brightness,
    #[serde(rename = "motion")]
    Motion,
    #[serde(rename = "temperature")]
    Temperature,
}

impl ChannelKind {
    /// Platform-facing channel name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnOff => "on-off",
            Self::Brightness => "brightness",
            Self::Motion => "motion",
            Self::Temperature => "temperature",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnOffChannel {
    value: Option<bool>,
}

impl OnOffChannel {
    #[must_use]
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    pub fn set(&mut self, state: bool) {
        self.value = Some(state);
    }

    #[must_use = "the notification must be published"]
    pub fn send(&mut self, state: bool) -> NotificationKind {
        self.set(state);
        NotificationKind::OnOff(state)
    }
}

/// Brightness in percent. The bus convention is `0.0..=100.0`; values are
/// stored as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrightnessChannel {
    value: Option<f64>,
}

impl BrightnessChannel {
    /// Inclusive range the bus uses for brightness levels.
    pub const RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set(&mut self, level: f64) {
        self.value = Some(level);
    }

    #[must_use = "the notification must be published"]
    pub fn send(&mut self, level: f64) -> NotificationKind {
        self.set(level);
        NotificationKind::Brightness(level)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionChannel;

impl MotionChannel {
    #[must_use = "the notification must be published"]
    pub fn send(&self) -> NotificationKind {
        NotificationKind::Motion
    }
}

/// Temperature reading in degrees Celsius.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureChannel {
    value: Option<f64>,
}

impl TemperatureChannel {
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set(&mut self, celsius: f64) {
        self.value = Some(celsius);
    }

    #[must_use = "the notification must be published"]
    pub fn send(&mut self, celsius: f64) -> NotificationKind {
        self.set(celsius);
        NotificationKind::Temperature(celsius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_store_without_notification_when_set() {
        let mut ch = OnOffChannel::default();
        ch.set(true);
        assert_eq!(ch.value(), Some(true));
    }

    #[test]
    fn should_store_and_return_notification_when_sent() {
        let mut ch = BrightnessChannel::default();
        let kind = ch.send(42.0);
        assert_eq!(ch.value(), Some(42.0));
        assert_eq!(kind, NotificationKind::Brightness(42.0));
    }

    #[test]
    fn should_overwrite_previous_value_when_sent() {
        let mut ch = TemperatureChannel::default();
        ch.set(18.5);
        let _ = ch.send(21.0);
        assert_eq!(ch.value(), Some(21.0));
    }

    #[test]
    fn should_pass_out_of_range_brightness_through() {
        let mut ch = BrightnessChannel::default();
        let _ = ch.send(140.0);
        assert_eq!(ch.value(), Some(140.0));
        assert!(!BrightnessChannel::RANGE.contains(&140.0));
    }

    #[test]
    fn should_emit_motion_pulse() {
        assert_eq!(MotionChannel.send(), NotificationKind::Motion);
    }

    #[test]
    fn should_use_platform_channel_names() {
        assert_eq!(ChannelKind::OnOff.to_string(), "on-off");
        assert_eq!(ChannelKind::Brightness.as_str(), "brightness");
        assert_eq!(
            serde_json::to_string(&ChannelKind::Temperature).unwrap(),
            "\"temperature\""
        );
    }
}
