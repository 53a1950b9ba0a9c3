//! Virtual adapter error types.

use webbrick_domain::error::BridgeError;

/// Errors raised by the simulated bus.
#[derive(Debug, thiserror::Error)]
pub enum VirtualBusError {
    /// A command addressed a device the hub does not have.
    #[error("no simulated device {0}")]
    UnknownDevice(String),

    /// A status request addressed something other than the simulated hub.
    #[error("no simulated hub {0}")]
    UnknownHub(String),

    /// The bus side of an injector has been dropped.
    #[error("simulated bus is gone")]
    Closed,
}

impl VirtualBusError {
    /// Convert into a [`BridgeError::Transport`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        BridgeError::Transport(Box::new(self))
    }
}

impl From<VirtualBusError> for BridgeError {
    fn from(err: VirtualBusError) -> Self {
        err.into_domain()
    }
}
