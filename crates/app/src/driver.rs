//! Driver — starts the reconciliation loop and hands out the command handle
//! the platform side uses to reach it.
//!
//! The loop task owns the bus transport, the platform adapter and the
//! registry. Commands travel over an mpsc channel and are answered on a
//! oneshot, so no lock ever guards a device record.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use webbrick_domain::error::BridgeError;
use webbrick_domain::id::DeviceIdentity;
use webbrick_domain::record::DeviceSnapshot;

use crate::config::DriverConfig;
use crate::ports::{BusTransport, Platform};
use crate::reconciler::Reconciler;

/// Capacity of the command channel between handles and the loop.
const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;

/// Requests the loop serves between bus events.
#[derive(Debug)]
pub(crate) enum Command {
    SetOnOff {
        identity: DeviceIdentity,
        state: bool,
        reply: Reply<Result<(), BridgeError>>,
    },
    Toggle {
        identity: DeviceIdentity,
        reply: Reply<Result<(), BridgeError>>,
    },
    SetBrightness {
        identity: DeviceIdentity,
        level: f64,
        reply: Reply<Result<(), BridgeError>>,
    },
    SetName {
        identity: DeviceIdentity,
        candidate: String,
        reply: Reply<Result<String, BridgeError>>,
    },
    PressButton {
        identity: DeviceIdentity,
        reply: Reply<Result<(), BridgeError>>,
    },
    Device {
        identity: DeviceIdentity,
        reply: Reply<Option<DeviceSnapshot>>,
    },
    Devices {
        reply: Reply<Vec<DeviceSnapshot>>,
    },
}

/// Handle to a running driver. Cheap to clone; every clone talks to the same
/// loop.
#[derive(Debug, Clone)]
pub struct Driver {
    commands: mpsc::Sender<Command>,
    task: Arc<JoinHandle<()>>,
}

impl Driver {
    /// Prepare the bus and spawn the reconciliation loop.
    ///
    /// A config that is not `initialised` is replaced by the defaults. Once
    /// running, the effective config is announced to the platform.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotReady`] when the bus reports it is not
    /// ready, or the transport's error when preparing fails. In both cases
    /// the loop is never entered and nothing is retried.
    pub async fn start<B, P>(
        config: DriverConfig,
        mut bus: B,
        platform: P,
    ) -> Result<Self, BridgeError>
    where
        B: BusTransport + 'static,
        P: Platform + 'static,
    {
        let config = config.effective();
        tracing::info!(name = %config.name, "driver starting");

        match bus.prepare(&config).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("bus transport not ready, driver not started");
                return Err(BridgeError::NotReady);
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "bus transport failed to prepare, driver not started"
                );
                return Err(err);
            }
        }

        if let Err(err) = platform.publish_config(&config).await {
            tracing::warn!(error = %err, "failed to publish driver config");
        }

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let reconciler = Reconciler::new(bus, platform, rx, &config);
        let task = tokio::spawn(reconciler.run());
        tracing::info!("reconciliation loop started");

        Ok(Self {
            commands: tx,
            task: Arc::new(task),
        })
    }

    /// Whether the loop task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// The driver runs for the lifetime of the process and cannot be stopped.
    ///
    /// # Errors
    ///
    /// Always returns [`BridgeError::Unsupported`]; the loop keeps running.
    pub fn stop(&self) -> Result<(), BridgeError> {
        tracing::warn!("stop requested, but this driver cannot be stopped");
        Err(BridgeError::Unsupported("stopping the driver"))
    }

    /// Switch an on/off device. Devices without an on/off channel ignore it.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotFound`] for an unknown identity, the transport's
    /// error if the bus write fails, or [`BridgeError::DriverUnavailable`].
    #[tracing::instrument(skip(self))]
    pub async fn set_on_off(
        &self,
        identity: DeviceIdentity,
        state: bool,
    ) -> Result<(), BridgeError> {
        self.request(|reply| Command::SetOnOff {
            identity,
            state,
            reply,
        })
        .await?
    }

    /// Flip an on/off device on the bus, then re-publish its cached state.
    ///
    /// # Errors
    ///
    /// Same as [`set_on_off`](Self::set_on_off).
    #[tracing::instrument(skip(self))]
    pub async fn toggle_on_off(&self, identity: DeviceIdentity) -> Result<(), BridgeError> {
        self.request(|reply| Command::Toggle { identity, reply })
            .await?
    }

    /// Set a light's brightness. Out-of-range levels are passed to the bus
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`set_on_off`](Self::set_on_off).
    #[tracing::instrument(skip(self))]
    pub async fn set_brightness(
        &self,
        identity: DeviceIdentity,
        level: f64,
    ) -> Result<(), BridgeError> {
        self.request(|reply| Command::SetBrightness {
            identity,
            level,
            reply,
        })
        .await?
    }

    /// Rename a device to the sanitized form of `candidate` and return it.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Validation`] when nothing legal remains of the
    /// candidate, [`BridgeError::NotFound`] for an unknown identity, or
    /// [`BridgeError::DriverUnavailable`].
    #[tracing::instrument(skip(self))]
    pub async fn set_name(
        &self,
        identity: DeviceIdentity,
        candidate: &str,
    ) -> Result<String, BridgeError> {
        let candidate = candidate.to_string();
        self.request(|reply| Command::SetName {
            identity,
            candidate,
            reply,
        })
        .await?
    }

    /// Press a bus button. Non-button devices ignore it.
    ///
    /// # Errors
    ///
    /// Same as [`set_on_off`](Self::set_on_off).
    #[tracing::instrument(skip(self))]
    pub async fn press_button(&self, identity: DeviceIdentity) -> Result<(), BridgeError> {
        self.request(|reply| Command::PressButton { identity, reply })
            .await?
    }

    /// Snapshot of one device, if known.
    ///
    /// # Errors
    ///
    /// [`BridgeError::DriverUnavailable`] if the loop is gone.
    pub async fn device(
        &self,
        identity: DeviceIdentity,
    ) -> Result<Option<DeviceSnapshot>, BridgeError> {
        self.request(|reply| Command::Device { identity, reply })
            .await
    }

    /// Snapshots of every known device, sorted by identity.
    ///
    /// # Errors
    ///
    /// [`BridgeError::DriverUnavailable`] if the loop is gone.
    pub async fn devices(&self) -> Result<Vec<DeviceSnapshot>, BridgeError> {
        self.request(|reply| Command::Devices { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, BridgeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| BridgeError::DriverUnavailable)?;
        response.await.map_err(|_| BridgeError::DriverUnavailable)
    }
}
