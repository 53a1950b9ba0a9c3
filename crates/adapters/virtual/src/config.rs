//! Simulated bus configuration.

use serde::Deserialize;

/// One device attached to the simulated hub.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulatedDeviceConfig {
    /// Bus identity of the device.
    pub id: String,
    /// Raw device-type code, as a real hub would report it.
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub level: f64,
}

impl SimulatedDeviceConfig {
    #[must_use]
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            state: false,
            level: 0.0,
        }
    }

    #[must_use]
    pub fn level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }
}

/// Configuration for the simulated bus.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualBusConfig {
    /// Identity of the simulated hub.
    pub hub: String,
    /// What `prepare` reports; `false` simulates a missing network interface.
    pub ready: bool,
    /// How long one poll waits for bus traffic, in milliseconds.
    pub poll_interval_ms: u64,
    pub devices: Vec<SimulatedDeviceConfig>,
}

impl Default for VirtualBusConfig {
    fn default() -> Self {
        Self {
            hub: "wb1".to_string(),
            ready: true,
            poll_interval_ms: 250,
            devices: vec![
                SimulatedDeviceConfig::new("1", "lightchannel", "Kitchen"),
                SimulatedDeviceConfig::new("2", "pir", "Hall"),
                SimulatedDeviceConfig::new("3", "temp", "Lounge").level(21.5),
                SimulatedDeviceConfig::new("4", "output", "Porch"),
                SimulatedDeviceConfig::new("5", "button", "Doorbell"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = VirtualBusConfig::default();
        assert_eq!(config.hub, "wb1");
        assert!(config.ready);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.devices.len(), 5);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            hub = "wb7"
            ready = false
            poll_interval_ms = 50

            [[devices]]
            id = "10"
            code = "dimmer"
            name = "Study"
            level = 30.0
        "#;
        let config: VirtualBusConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.hub, "wb7");
        assert!(!config.ready);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].code, "dimmer");
        assert_eq!(config.devices[0].level, 30.0);
        assert!(!config.devices[0].state);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: VirtualBusConfig = toml::from_str("poll_interval_ms = 10").unwrap();
        assert_eq!(config.hub, "wb1");
        assert_eq!(config.devices.len(), 5);
    }
}
