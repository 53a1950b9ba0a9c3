//! In-memory platform.
//!
//! Records everything the driver exports and notifies, and logs each call
//! as JSON so a demo run shows what a real platform would receive.

use std::sync::{Mutex, MutexGuard, PoisonError};

use webbrick_app::DriverConfig;
use webbrick_app::ports::Platform;
use webbrick_domain::channel::ChannelKind;
use webbrick_domain::error::{BridgeError, NotFoundError};
use webbrick_domain::id::{DeviceIdentity, PlatformHandle};
use webbrick_domain::notification::Notification;
use webbrick_domain::record::DeviceDescriptor;

/// A device as the platform registered it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDevice {
    pub handle: PlatformHandle,
    pub descriptor: DeviceDescriptor,
    pub channels: Vec<ChannelKind>,
}

#[derive(Debug, Default)]
struct State {
    devices: Vec<ExportedDevice>,
    notifications: Vec<Notification>,
    config: Option<DriverConfig>,
}

/// A [`Platform`] that keeps exports and notifications in memory.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every exported device, in export order.
    #[must_use]
    pub fn devices(&self) -> Vec<ExportedDevice> {
        self.lock().devices.clone()
    }

    #[must_use]
    pub fn device(&self, identity: &DeviceIdentity) -> Option<ExportedDevice> {
        self.lock()
            .devices
            .iter()
            .find(|device| device.descriptor.identity == *identity)
            .cloned()
    }

    /// Every notification received, in delivery order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    #[must_use]
    pub fn notifications_for(&self, identity: &DeviceIdentity) -> Vec<Notification> {
        self.lock()
            .notifications
            .iter()
            .filter(|n| n.identity == *identity)
            .cloned()
            .collect()
    }

    /// The configuration the driver announced, if any.
    #[must_use]
    pub fn config(&self) -> Option<DriverConfig> {
        self.lock().config.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_json(value: &impl serde::Serialize) -> Result<String, BridgeError> {
    serde_json::to_string(value).map_err(|err| BridgeError::Platform(Box::new(err)))
}

impl Platform for InMemoryPlatform {
    async fn export_device(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<PlatformHandle, BridgeError> {
        let payload = to_json(descriptor)?;
        let handle = PlatformHandle::new();
        tracing::info!(%handle, device = %payload, "device exported");
        self.lock().devices.push(ExportedDevice {
            handle,
            descriptor: descriptor.clone(),
            channels: Vec::new(),
        });
        Ok(handle)
    }

    async fn export_channel(
        &self,
        handle: PlatformHandle,
        identity: &DeviceIdentity,
        channel: ChannelKind,
    ) -> Result<(), BridgeError> {
        let mut state = self.lock();
        let device = state
            .devices
            .iter_mut()
            .find(|device| device.handle == handle)
            .ok_or_else(|| NotFoundError {
                entity: "Exported device",
                id: handle.to_string(),
            })?;
        device.channels.push(channel);
        tracing::info!(%handle, %identity, %channel, "channel exported");
        Ok(())
    }

    async fn notify(&self, notification: Notification) -> Result<(), BridgeError> {
        let payload = to_json(&notification)?;
        tracing::info!(notification = %payload, "notify");
        self.lock().notifications.push(notification);
        Ok(())
    }

    async fn publish_config(&self, config: &DriverConfig) -> Result<(), BridgeError> {
        let payload = to_json(config)?;
        tracing::info!(config = %payload, "config");
        self.lock().config = Some(config.clone());
        Ok(())
    }
}
