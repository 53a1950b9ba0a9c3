//! # webbrickd — webbrick bridge daemon
//!
//! Composition root that wires the bus and platform adapters to the driver.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise structured logging
//! - Construct the bus transport and the platform adapter
//! - Start the driver, which owns the reconciliation loop
//! - Run until SIGINT; the loop itself never stops
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use webbrick_adapter_virtual::{InMemoryPlatform, VirtualBus};
use webbrick_app::Driver;
use webbrick_domain::error::BridgeError;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let bus = VirtualBus::new(&config.virtual_bus);
    let platform = Arc::new(InMemoryPlatform::new());

    // Driver
    let driver = Driver::start(config.driver, bus, Arc::clone(&platform))
        .await
        .context("driver failed to start")?;
    tracing::info!("webbrickd running, press ctrl-c to exit");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    match driver.stop() {
        Ok(()) => {}
        Err(BridgeError::Unsupported(what)) => {
            tracing::warn!(%what, "driver runs until the process exits");
        }
        Err(err) => return Err(err.into()),
    }

    let devices = driver.devices().await?;
    tracing::info!(
        devices = devices.len(),
        notifications = platform.notifications().len(),
        "exiting"
    );
    Ok(())
}
