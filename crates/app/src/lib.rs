//! # webbrick-app
//!
//! Application layer — **port definitions** (traits) and the reconciliation
//! engine that drives them.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BusTransport` — events, polling and raw commands of the physical bus
//!   - `Platform` — device/channel registration and outward notifications
//! - Run the **reconciliation loop**: one event at a time, classify, look up
//!   or onboard the device record, push state to the platform
//! - Provide the **driver** actor and its command handle so platform-side
//!   commands reach the registry through the same single task
//!
//! ## Dependency rule
//! Depends on `webbrick-domain` only (plus `tokio` for the actor task and
//! its channels). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod config;
pub mod driver;
pub mod ports;
pub mod reconciler;

pub use config::DriverConfig;
pub use driver::Driver;
