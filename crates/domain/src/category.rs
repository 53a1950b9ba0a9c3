//! Device classification — raw bus type codes to logical categories, and
//! the capability set each category carries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::{
    BrightnessChannel, ChannelKind, MotionChannel, OnOffChannel, TemperatureChannel,
};

/// Logical device class derived from a raw bus type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Light,
    Motion,
    Button,
    State,
    Temperature,
    Unknown,
}

impl DeviceCategory {
    /// Human-readable category label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Motion => "Motion Sensor",
            Self::Button => "Button",
            Self::State => "State Output",
            Self::Temperature => "Temperature Sensor",
            Self::Unknown => "Unknown Device",
        }
    }

    /// Channels a record of this category exposes, in export order.
    #[must_use]
    pub fn channel_kinds(self) -> &'static [ChannelKind] {
        match self {
            Self::Light => &[ChannelKind::OnOff, ChannelKind::Brightness],
            Self::Motion => &[ChannelKind::Motion],
            Self::State => &[ChannelKind::OnOff],
            Self::Temperature => &[ChannelKind::Temperature],
            Self::Button | Self::Unknown => &[],
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw bus device-type code to its category and label.
///
/// Matching ignores case and surrounding whitespace. Unrecognised codes
/// classify as [`DeviceCategory::Unknown`] so the device degrades to an
/// inert record instead of failing.
#[must_use]
pub fn classify(code: &str) -> (DeviceCategory, &'static str) {
    let category = match code.trim().to_ascii_lowercase().as_str() {
        "light" | "lightchannel" | "dimmer" => DeviceCategory::Light,
        "pir" | "motion" => DeviceCategory::Motion,
        "button" | "trigger" => DeviceCategory::Button,
        "output" | "state" => DeviceCategory::State,
        "temp" | "temperature" => DeviceCategory::Temperature,
        _ => DeviceCategory::Unknown,
    };
    (category, category.label())
}

/// The exact channel set of a record, tagged by category.
///
/// A record holds one of these from construction on, so a category can never
/// carry a channel it does not grant (a motion sensor has no brightness).
#[derive(Debug, Clone, PartialEq)]
pub enum Capabilities {
    Light {
        on_off: OnOffChannel,
        brightness: BrightnessChannel,
    },
    Motion {
        motion: MotionChannel,
    },
    Button,
    State {
        on_off: OnOffChannel,
    },
    Temperature {
        temperature: TemperatureChannel,
    },
    Unknown,
}

impl Capabilities {
    /// Fresh channels for `category`, all without a value.
    #[must_use]
    pub fn for_category(category: DeviceCategory) -> Self {
        match category {
            DeviceCategory::Light => Self::Light {
                on_off: OnOffChannel::default(),
                brightness: BrightnessChannel::default(),
            },
            DeviceCategory::Motion => Self::Motion {
                motion: MotionChannel,
            },
            DeviceCategory::Button => Self::Button,
            DeviceCategory::State => Self::State {
                on_off: OnOffChannel::default(),
            },
            DeviceCategory::Temperature => Self::Temperature {
                temperature: TemperatureChannel::default(),
            },
            DeviceCategory::Unknown => Self::Unknown,
        }
    }

    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        match self {
            Self::Light { .. } => DeviceCategory::Light,
            Self::Motion { .. } => DeviceCategory::Motion,
            Self::Button => DeviceCategory::Button,
            Self::State { .. } => DeviceCategory::State,
            Self::Temperature { .. } => DeviceCategory::Temperature,
            Self::Unknown => DeviceCategory::Unknown,
        }
    }

    #[must_use]
    pub fn kinds(&self) -> &'static [ChannelKind] {
        self.category().channel_kinds()
    }

    #[must_use]
    pub fn has(&self, kind: ChannelKind) -> bool {
        self.kinds().contains(&kind)
    }

    #[must_use]
    pub fn on_off(&self) -> Option<&OnOffChannel> {
        match self {
            Self::Light { on_off, .. } | Self::State { on_off } => Some(on_off),
            _ => None,
        }
    }

    pub fn on_off_mut(&mut self) -> Option<&mut OnOffChannel> {
        match self {
            Self::Light { on_off, .. } | Self::State { on_off } => Some(on_off),
            _ => None,
        }
    }

    #[must_use]
    pub fn brightness(&self) -> Option<&BrightnessChannel> {
        match self {
            Self::Light { brightness, .. } => Some(brightness),
            _ => None,
        }
    }

    pub fn brightness_mut(&mut self) -> Option<&mut BrightnessChannel> {
        match self {
            Self::Light { brightness, .. } => Some(brightness),
            _ => None,
        }
    }

    #[must_use]
    pub fn motion(&self) -> Option<&MotionChannel> {
        match self {
            Self::Motion { motion } => Some(motion),
            _ => None,
        }
    }

    #[must_use]
    pub fn temperature(&self) -> Option<&TemperatureChannel> {
        match self {
            Self::Temperature { temperature } => Some(temperature),
            _ => None,
        }
    }

    pub fn temperature_mut(&mut self) -> Option<&mut TemperatureChannel> {
        match self {
            Self::Temperature { temperature } => Some(temperature),
            _ => None,
        }
    }
}
