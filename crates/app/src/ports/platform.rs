//! Platform port — the smart-home platform the bridge exports devices to.

use std::future::Future;

use webbrick_domain::channel::ChannelKind;
use webbrick_domain::error::BridgeError;
use webbrick_domain::id::{DeviceIdentity, PlatformHandle};
use webbrick_domain::notification::Notification;
use webbrick_domain::record::DeviceDescriptor;

use crate::config::DriverConfig;

/// Registers devices and channels with the platform and forwards
/// notifications to it.
pub trait Platform: Send + Sync {
    /// Register a new logical device and return the platform's handle for it.
    fn export_device(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> impl Future<Output = Result<PlatformHandle, BridgeError>> + Send;

    /// Register one channel of an exported device.
    fn export_channel(
        &self,
        handle: PlatformHandle,
        identity: &DeviceIdentity,
        channel: ChannelKind,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Deliver a channel change or rename.
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Announce the driver's effective configuration. The default
    /// implementation ignores it.
    fn publish_config(
        &self,
        _config: &DriverConfig,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        async { Ok(()) }
    }
}

impl<T: Platform> Platform for std::sync::Arc<T> {
    fn export_device(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> impl Future<Output = Result<PlatformHandle, BridgeError>> + Send {
        (**self).export_device(descriptor)
    }

    fn export_channel(
        &self,
        handle: PlatformHandle,
        identity: &DeviceIdentity,
        channel: ChannelKind,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).export_channel(handle, identity, channel)
    }

    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).notify(notification)
    }

    fn publish_config(
        &self,
        config: &DriverConfig,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish_config(config)
    }
}
