//! Bus transport port — the physical `WebBrick` bus as seen by the driver.
//!
//! The transport owns discovery, datagram handling and the wire encoding.
//! The driver only consumes its event queue and issues raw commands keyed by
//! device identity.

use std::future::Future;

use webbrick_domain::error::BridgeError;
use webbrick_domain::event::BusEvent;
use webbrick_domain::id::DeviceIdentity;

use crate::config::DriverConfig;

/// A bus transport driven by the reconciliation loop.
///
/// Every method is called from the single driver task, so implementations
/// need no internal locking.
pub trait BusTransport: Send {
    /// Bring the transport up. `Ok(false)` means the bus is not ready; the
    /// driver then refuses to start.
    fn prepare(
        &mut self,
        config: &DriverConfig,
    ) -> impl Future<Output = Result<bool, BridgeError>> + Send;

    /// Take the next pending event without waiting.
    fn try_next_event(&mut self) -> Option<BusEvent>;

    /// Housekeeping hook: drain low-level datagrams and heartbeats. Called
    /// whenever no event is pending.
    fn poll(&mut self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Ask a hub to report the status of everything attached to it.
    fn poll_status(
        &mut self,
        identity: &DeviceIdentity,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Stop treating `identity` as newly discovered.
    fn mark_queried(&mut self, identity: &DeviceIdentity);

    fn set_state(
        &mut self,
        identity: &DeviceIdentity,
        state: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn toggle(
        &mut self,
        identity: &DeviceIdentity,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Set a brightness level. The bus is authoritative for the range.
    fn set_level(
        &mut self,
        identity: &DeviceIdentity,
        level: f64,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn push_button(
        &mut self,
        identity: &DeviceIdentity,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
