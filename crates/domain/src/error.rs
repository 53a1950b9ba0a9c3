//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `From` when crossing a port boundary.

/// Top-level error for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The bus transport reported it is not ready; the driver never started.
    #[error("bus transport is not ready")]
    NotReady,

    /// The operation is deliberately unsupported.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A bus transport operation failed.
    #[error("bus transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A platform export or notification failed.
    #[error("platform error")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The reconciliation loop is gone and can no longer accept commands.
    #[error("driver is no longer running")]
    DriverUnavailable,
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
}

/// A lookup by identity found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
