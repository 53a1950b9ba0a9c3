//! # webbrick-adapter-virtual
//!
//! A simulated `WebBrick` bus and an in-memory platform, so the driver can
//! run end to end without hardware or a platform SDK.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualBus`] | `BusTransport` | One hub with configurable devices; announces them until queried, echoes every write |
//! | [`InMemoryPlatform`] | `Platform` | Records exports, notifications and the announced config; logs each call as JSON |
//!
//! ## Dependency rule
//!
//! Depends on `webbrick-app` (port traits) and `webbrick-domain` only.

mod bus;
mod config;
mod devices;
mod error;
mod platform;

pub use bus::{BusInjector, VirtualBus};
pub use config::{SimulatedDeviceConfig, VirtualBusConfig};
pub use devices::SimulatedDevice;
pub use error::VirtualBusError;
pub use platform::{ExportedDevice, InMemoryPlatform};
