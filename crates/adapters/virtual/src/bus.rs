//! Simulated bus transport.
//!
//! Behaves like a single hub on a quiet network: the hub announces itself
//! on the first poll, its devices are announced on every later poll until
//! the bridge marks them queried, and every write is echoed back as a
//! status event.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use tokio::sync::mpsc;

use webbrick_app::DriverConfig;
use webbrick_app::ports::BusTransport;
use webbrick_domain::error::BridgeError;
use webbrick_domain::event::{BusEvent, DeviceInfo};
use webbrick_domain::id::DeviceIdentity;

use crate::config::VirtualBusConfig;
use crate::devices::SimulatedDevice;
use crate::error::VirtualBusError;

/// Device-type code the simulated hub reports for itself.
const HUB_CODE: &str = "webbrick";

#[derive(Debug)]
enum Injection {
    Trigger(DeviceIdentity),
    Report {
        identity: DeviceIdentity,
        state: bool,
        level: f64,
    },
}

/// Feeds physical-world activity into a [`VirtualBus`] after it has been
/// handed to the driver.
#[derive(Debug, Clone)]
pub struct BusInjector {
    tx: mpsc::UnboundedSender<Injection>,
}

impl BusInjector {
    /// Fire a sensor, as if someone walked past it.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualBusError::Closed`] if the bus has been dropped.
    pub fn trigger(&self, identity: impl Into<DeviceIdentity>) -> Result<(), VirtualBusError> {
        self.send(Injection::Trigger(identity.into()))
    }

    /// Change a device locally, as if from a wall switch or a new reading.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualBusError::Closed`] if the bus has been dropped.
    pub fn report(
        &self,
        identity: impl Into<DeviceIdentity>,
        state: bool,
        level: f64,
    ) -> Result<(), VirtualBusError> {
        self.send(Injection::Report {
            identity: identity.into(),
            state,
            level,
        })
    }

    fn send(&self, injection: Injection) -> Result<(), VirtualBusError> {
        self.tx.send(injection).map_err(|_| VirtualBusError::Closed)
    }
}

/// A [`BusTransport`] backed by simulated devices.
pub struct VirtualBus {
    hub: DeviceIdentity,
    ready: bool,
    interval: Duration,
    devices: BTreeMap<DeviceIdentity, SimulatedDevice>,
    queue: VecDeque<BusEvent>,
    hub_announced: bool,
    injections: mpsc::UnboundedReceiver<Injection>,
    injector: mpsc::UnboundedSender<Injection>,
}

impl VirtualBus {
    #[must_use]
    pub fn new(config: &VirtualBusConfig) -> Self {
        let devices = config
            .devices
            .iter()
            .map(SimulatedDevice::from)
            .map(|device| (device.identity().clone(), device))
            .collect();
        let (injector, injections) = mpsc::unbounded_channel();
        Self {
            hub: DeviceIdentity::new(config.hub.clone()),
            ready: config.ready,
            interval: Duration::from_millis(config.poll_interval_ms),
            devices,
            queue: VecDeque::new(),
            hub_announced: false,
            injections,
            injector,
        }
    }

    #[must_use]
    pub fn injector(&self) -> BusInjector {
        BusInjector {
            tx: self.injector.clone(),
        }
    }

    #[must_use]
    pub fn device(&self, identity: &DeviceIdentity) -> Option<&SimulatedDevice> {
        self.devices.get(identity)
    }

    fn device_mut(
        &mut self,
        identity: &DeviceIdentity,
    ) -> Result<&mut SimulatedDevice, VirtualBusError> {
        self.devices
            .get_mut(identity)
            .ok_or_else(|| VirtualBusError::UnknownDevice(identity.to_string()))
    }

    fn announce(&mut self) {
        if !self.hub_announced {
            self.hub_announced = true;
            self.queue.push_back(BusEvent::new(
                "newwebbrickfound",
                DeviceInfo::new(self.hub.clone(), HUB_CODE),
            ));
            return;
        }
        self.queue.extend(
            self.devices
                .values()
                .filter(|device| !device.is_queried())
                .map(SimulatedDevice::discovered),
        );
    }

    fn apply(&mut self, injection: Injection) {
        let result = match injection {
            Injection::Trigger(identity) => {
                self.device_mut(&identity).map(|device| device.triggered())
            }
            Injection::Report {
                identity,
                state,
                level,
            } => self.device_mut(&identity).map(|device| {
                device.report(state, level);
                device.updated()
            }),
        };
        match result {
            Ok(event) => self.queue.push_back(event),
            Err(err) => tracing::warn!(error = %err, "injection dropped"),
        }
    }
}

impl BusTransport for VirtualBus {
    async fn prepare(&mut self, config: &DriverConfig) -> Result<bool, BridgeError> {
        tracing::info!(
            hub = %self.hub,
            devices = self.devices.len(),
            installation = %config.name,
            ready = self.ready,
            "virtual bus prepared"
        );
        Ok(self.ready)
    }

    fn try_next_event(&mut self) -> Option<BusEvent> {
        self.queue.pop_front()
    }

    async fn poll(&mut self) -> Result<(), BridgeError> {
        self.announce();
        if self.queue.is_empty() {
            // Quiet bus: wait for traffic up to one interval.
            if let Ok(Some(injection)) =
                tokio::time::timeout(self.interval, self.injections.recv()).await
            {
                self.apply(injection);
            }
        }
        while let Ok(injection) = self.injections.try_recv() {
            self.apply(injection);
        }
        Ok(())
    }

    async fn poll_status(&mut self, identity: &DeviceIdentity) -> Result<(), BridgeError> {
        if *identity != self.hub {
            return Err(VirtualBusError::UnknownHub(identity.to_string()).into());
        }
        tracing::debug!(hub = %identity, "status requested");
        self.queue
            .extend(self.devices.values().map(SimulatedDevice::status));
        Ok(())
    }

    fn mark_queried(&mut self, identity: &DeviceIdentity) {
        if let Some(device) = self.devices.get_mut(identity) {
            device.mark_queried();
        }
    }

    async fn set_state(
        &mut self,
        identity: &DeviceIdentity,
        state: bool,
    ) -> Result<(), BridgeError> {
        let device = self.device_mut(identity)?;
        device.set_state(state);
        let echo = device.updated();
        tracing::debug!(%identity, state, "set state");
        self.queue.push_back(echo);
        Ok(())
    }

    async fn toggle(&mut self, identity: &DeviceIdentity) -> Result<(), BridgeError> {
        let device = self.device_mut(identity)?;
        device.toggle();
        let echo = device.updated();
        tracing::debug!(%identity, "toggle");
        self.queue.push_back(echo);
        Ok(())
    }

    async fn set_level(
        &mut self,
        identity: &DeviceIdentity,
        level: f64,
    ) -> Result<(), BridgeError> {
        let device = self.device_mut(identity)?;
        device.set_level(level);
        let echo = device.updated();
        tracing::debug!(%identity, level, "set level");
        self.queue.push_back(echo);
        Ok(())
    }

    async fn push_button(&mut self, identity: &DeviceIdentity) -> Result<(), BridgeError> {
        self.device_mut(identity)?.press();
        tracing::debug!(%identity, "button pushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatedDeviceConfig;

    fn config() -> VirtualBusConfig {
        VirtualBusConfig {
            poll_interval_ms: 10,
            devices: vec![
                SimulatedDeviceConfig::new("1", "lightchannel", "Kitchen"),
                SimulatedDeviceConfig::new("2", "pir", "Hall"),
            ],
            ..VirtualBusConfig::default()
        }
    }

    fn drain(bus: &mut VirtualBus) -> Vec<String> {
        std::iter::from_fn(|| bus.try_next_event())
            .map(|event| event.name)
            .collect()
    }

    #[tokio::test]
    async fn should_report_readiness_from_config() {
        let mut bus = VirtualBus::new(&VirtualBusConfig {
            ready: false,
            ..config()
        });
        assert!(!bus.prepare(&DriverConfig::default()).await.unwrap());
    }

    #[tokio::test]
    async fn should_announce_hub_before_devices() {
        let mut bus = VirtualBus::new(&config());

        bus.poll().await.unwrap();
        assert_eq!(drain(&mut bus), vec!["newwebbrickfound"]);

        bus.poll().await.unwrap();
        assert_eq!(drain(&mut bus), vec!["newlightchannelfound", "newpirfound"]);
    }

    #[tokio::test]
    async fn should_stop_announcing_queried_devices() {
        let mut bus = VirtualBus::new(&config());
        bus.poll().await.unwrap();
        drain(&mut bus);

        bus.mark_queried(&"1".into());
        bus.poll().await.unwrap();

        assert_eq!(drain(&mut bus), vec!["newpirfound"]);
        assert!(bus.device(&"1".into()).unwrap().is_queried());
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_one_interval_when_bus_is_quiet() {
        let mut bus = VirtualBus::new(&config());
        bus.poll().await.unwrap();
        drain(&mut bus);
        bus.mark_queried(&"1".into());
        bus.mark_queried(&"2".into());

        let started = tokio::time::Instant::now();
        bus.poll().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(bus.try_next_event().is_none());
    }

    #[tokio::test]
    async fn should_report_every_device_when_hub_status_requested() {
        let mut bus = VirtualBus::new(&config());

        bus.poll_status(&"wb1".into()).await.unwrap();

        assert_eq!(
            drain(&mut bus),
            vec!["existinglightchannelfound", "existingpirfound"]
        );
    }

    #[tokio::test]
    async fn should_reject_status_request_for_unknown_hub() {
        let mut bus = VirtualBus::new(&config());
        let result = bus.poll_status(&"wb9".into()).await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[tokio::test]
    async fn should_echo_state_after_write() {
        let mut bus = VirtualBus::new(&config());

        bus.set_level(&"1".into(), 65.0).await.unwrap();

        let event = bus.try_next_event().unwrap();
        assert_eq!(event.name, "existinglightchannelupdated");
        assert!(event.device_info.state);
        assert_eq!(event.device_info.level, 65.0);
    }

    #[tokio::test]
    async fn should_reject_write_for_unknown_device() {
        let mut bus = VirtualBus::new(&config());
        let result = bus.set_state(&"99".into(), true).await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[tokio::test]
    async fn should_count_button_pushes_without_echo() {
        let mut bus = VirtualBus::new(&VirtualBusConfig {
            devices: vec![SimulatedDeviceConfig::new("5", "button", "Bell")],
            ..config()
        });

        bus.push_button(&"5".into()).await.unwrap();

        assert_eq!(bus.device(&"5".into()).unwrap().presses(), 1);
        assert!(bus.try_next_event().is_none());
    }

    #[tokio::test]
    async fn should_queue_injected_trigger_on_next_poll() {
        let mut bus = VirtualBus::new(&config());
        bus.poll().await.unwrap();
        drain(&mut bus);
        bus.mark_queried(&"1".into());
        bus.mark_queried(&"2".into());

        bus.injector().trigger("2").unwrap();
        bus.injector().report("1", true, 80.0).unwrap();
        bus.poll().await.unwrap();

        assert_eq!(
            drain(&mut bus),
            vec!["existingpirtriggered", "existinglightchannelupdated"]
        );
        assert_eq!(bus.device(&"1".into()).unwrap().level(), 80.0);
    }

    #[tokio::test]
    async fn should_drop_injection_for_unknown_device() {
        let mut bus = VirtualBus::new(&config());
        bus.poll().await.unwrap();
        drain(&mut bus);
        bus.mark_queried(&"1".into());
        bus.mark_queried(&"2".into());

        bus.injector().trigger("77").unwrap();
        bus.poll().await.unwrap();

        assert!(bus.try_next_event().is_none());
    }
}
