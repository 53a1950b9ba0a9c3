//! Simulated devices attached to the virtual hub.

use webbrick_domain::event::{BusEvent, DeviceInfo};
use webbrick_domain::id::DeviceIdentity;

use crate::config::SimulatedDeviceConfig;

/// A device on the simulated bus, with the state a real one would hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDevice {
    identity: DeviceIdentity,
    code: String,
    name: String,
    state: bool,
    level: f64,
    presses: u32,
    queried: bool,
}

impl SimulatedDevice {
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    #[must_use]
    pub fn state(&self) -> bool {
        self.state
    }

    #[must_use]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Number of times the button was pushed from the bridge.
    #[must_use]
    pub fn presses(&self) -> u32 {
        self.presses
    }

    /// Whether the bridge has acknowledged this device.
    #[must_use]
    pub fn is_queried(&self) -> bool {
        self.queried
    }

    pub(crate) fn mark_queried(&mut self) {
        self.queried = true;
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.state = state;
    }

    pub(crate) fn toggle(&mut self) {
        self.state = !self.state;
    }

    /// Dimming to zero switches the channel off; any other level switches it on.
    pub(crate) fn set_level(&mut self, level: f64) {
        self.level = level;
        self.state = level > 0.0;
    }

    pub(crate) fn report(&mut self, state: bool, level: f64) {
        self.state = state;
        self.level = level;
    }

    pub(crate) fn press(&mut self) {
        self.presses += 1;
    }

    /// Event family used in this device's event names. Codes the hub has no
    /// family for are announced as outputs.
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self.code.as_str() {
            "light" | "lightchannel" | "dimmer" => "lightchannel",
            "pir" | "motion" => "pir",
            "temp" | "temperature" => "temp",
            "button" => "button",
            "trigger" => "trigger",
            _ => "output",
        }
    }

    pub(crate) fn discovered(&self) -> BusEvent {
        self.event(format!("new{}found", self.family()))
    }

    pub(crate) fn status(&self) -> BusEvent {
        self.event(format!("existing{}found", self.family()))
    }

    pub(crate) fn updated(&self) -> BusEvent {
        self.event(format!("existing{}updated", self.family()))
    }

    pub(crate) fn triggered(&self) -> BusEvent {
        self.event(format!("existing{}triggered", self.family()))
    }

    fn event(&self, name: String) -> BusEvent {
        BusEvent::new(
            name,
            DeviceInfo::new(self.identity.clone(), self.code.clone())
                .name(self.name.clone())
                .state(self.state)
                .level(self.level),
        )
    }
}

impl From<&SimulatedDeviceConfig> for SimulatedDevice {
    fn from(config: &SimulatedDeviceConfig) -> Self {
        Self {
            identity: DeviceIdentity::new(config.id.clone()),
            code: config.code.clone(),
            name: config.name.clone(),
            state: config.state,
            level: config.level,
            presses: 0,
            queried: false,
        }
    }
}
