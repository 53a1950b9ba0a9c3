//! Event reconciliation loop.
//!
//! One task, one event at a time: take a bus event if one is pending,
//! otherwise serve at most one platform command and run bus housekeeping
//! before the queue is checked again. The task owns the [`Registry`];
//! nothing else mutates a device record.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;

use webbrick_domain::category::DeviceCategory;
use webbrick_domain::channel::{BrightnessChannel, ChannelKind};
use webbrick_domain::error::{BridgeError, NotFoundError};
use webbrick_domain::event::{BusEvent, DeviceInfo, EventKind};
use webbrick_domain::id::DeviceIdentity;
use webbrick_domain::notification::Notification;
use webbrick_domain::record::{DeviceRecord, DeviceSnapshot};
use webbrick_domain::registry::Registry;

use crate::config::DriverConfig;
use crate::driver::Command;
use crate::ports::{BusTransport, Platform};

/// What a single [`Reconciler::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consumed one bus event.
    Event,
    /// Served one platform command, then ran the transport's polling hook.
    Command,
    /// No event or command was pending; ran the transport's polling hook.
    Polled,
}

struct HubPollSchedule {
    every: Duration,
    next_due: Instant,
}

pub struct Reconciler<B, P> {
    bus: B,
    platform: P,
    registry: Registry,
    commands: mpsc::Receiver<Command>,
    hubs: BTreeSet<DeviceIdentity>,
    hub_poll: Option<HubPollSchedule>,
}

impl<B: BusTransport, P: Platform> Reconciler<B, P> {
    pub(crate) fn new(
        bus: B,
        platform: P,
        commands: mpsc::Receiver<Command>,
        config: &DriverConfig,
    ) -> Self {
        let hub_poll = config.hub_poll_interval().map(|every| HubPollSchedule {
            every,
            next_due: Instant::now() + every,
        });
        Self {
            bus,
            platform,
            registry: Registry::new(),
            commands,
            hubs: BTreeSet::new(),
            hub_poll,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run forever. The loop has no exit path; bad events are contained in
    /// their own step.
    pub async fn run(mut self) {
        loop {
            self.step().await;
            tokio::task::yield_now().await;
        }
    }

    /// One iteration of the loop.
    pub async fn step(&mut self) -> Step {
        if let Some(event) = self.bus.try_next_event() {
            self.handle_event(event).await;
            return Step::Event;
        }

        let step = match self.commands.try_recv() {
            Ok(command) => {
                self.handle_command(command).await;
                Step::Command
            }
            Err(_) => Step::Polled,
        };

        self.poll_hubs_if_due().await;
        if let Err(err) = self.bus.poll().await {
            tracing::warn!(error = %err, "bus poll failed");
        }
        step
    }

    #[tracing::instrument(skip_all, fields(event = %event.name, id = %event.device_info.id))]
    async fn handle_event(&mut self, event: BusEvent) {
        let Some(kind) = event.kind() else {
            tracing::trace!("ignoring event");
            return;
        };
        let info = event.device_info;

        match kind {
            EventKind::HubFound => self.hub_found(info.id).await,
            EventKind::HubSeen => tracing::debug!("hub seen again"),
            EventKind::DeviceFound if self.registry.contains(&info.id) => {
                self.update(info).await;
            }
            EventKind::DeviceFound => self.onboard(info).await,
            EventKind::DeviceUpdated => self.update(info).await,
            EventKind::SensorTriggered => self.triggered(&info.id).await,
        }
    }

    async fn hub_found(&mut self, identity: DeviceIdentity) {
        tracing::info!("hub found, requesting status");
        if let Err(err) = self.bus.poll_status(&identity).await {
            tracing::warn!(error = %err, "hub status request failed");
        }
        self.hubs.insert(identity);
    }

    async fn onboard(&mut self, info: DeviceInfo) {
        let mut record = DeviceRecord::new(info.id.clone(), &info.name, &info.category_code);

        let handle = match self.platform.export_device(&record.descriptor()).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(error = %err, "device export failed, will retry on next discovery");
                return;
            }
        };
        record.mark_onboarded(handle);

        for &kind in record.capabilities().kinds() {
            if let Err(err) = self
                .platform
                .export_channel(handle, record.identity(), kind)
                .await
            {
                tracing::warn!(error = %err, channel = %kind, "channel export failed");
            }
            let initial = match kind {
                ChannelKind::OnOff => record.send_on_off(info.state),
                ChannelKind::Brightness => {
                    warn_if_out_of_range(&info.id, info.level);
                    record.send_brightness(info.level)
                }
                ChannelKind::Temperature => record.send_temperature(info.level),
                ChannelKind::Motion => None,
            };
            if let Some(notification) = initial {
                publish(&self.platform, notification).await;
            }
        }

        let category = record.category();
        if self.registry.insert(record).is_none() {
            tracing::warn!("device registered twice, keeping the first record");
            return;
        }
        self.bus.mark_queried(&info.id);
        tracing::info!(%category, "device onboarded");
    }

    async fn update(&mut self, info: DeviceInfo) {
        let Some(record) = self.registry.get_mut(&info.id) else {
            tracing::debug!("update for unknown device ignored");
            return;
        };
        record.refresh_name(&info.name);
        record.touch(Utc::now());

        let notifications: Vec<Notification> = match record.category() {
            DeviceCategory::Light => {
                warn_if_out_of_range(&info.id, info.level);
                [record.send_on_off(info.state), record.send_brightness(info.level)]
                    .into_iter()
                    .flatten()
                    .collect()
            }
            DeviceCategory::State => record.send_on_off(info.state).into_iter().collect(),
            DeviceCategory::Temperature => {
                record.send_temperature(info.level).into_iter().collect()
            }
            DeviceCategory::Motion | DeviceCategory::Button | DeviceCategory::Unknown => {
                Vec::new()
            }
        };

        for notification in notifications {
            publish(&self.platform, notification).await;
        }
    }

    async fn triggered(&mut self, identity: &DeviceIdentity) {
        let Some(record) = self.registry.get_mut(identity) else {
            tracing::debug!("trigger for unknown device ignored");
            return;
        };
        record.touch(Utc::now());
        match record.pulse_motion() {
            Some(notification) => publish(&self.platform, notification).await,
            None => tracing::debug!("trigger on a device without motion channel ignored"),
        }
    }

    async fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::SetOnOff {
                identity,
                state,
                reply,
            } => {
                let _ = reply.send(self.set_on_off(&identity, state).await);
            }
            Command::Toggle { identity, reply } => {
                let _ = reply.send(self.toggle_on_off(&identity).await);
            }
            Command::SetBrightness {
                identity,
                level,
                reply,
            } => {
                let _ = reply.send(self.set_brightness(&identity, level).await);
            }
            Command::SetName {
                identity,
                candidate,
                reply,
            } => {
                let _ = reply.send(self.set_name(&identity, &candidate).await);
            }
            Command::PressButton { identity, reply } => {
                let _ = reply.send(self.press_button(&identity).await);
            }
            Command::Device { identity, reply } => {
                let _ = reply.send(self.registry.get(&identity).map(DeviceRecord::snapshot));
            }
            Command::Devices { reply } => {
                let mut all: Vec<DeviceSnapshot> =
                    self.registry.iter().map(DeviceRecord::snapshot).collect();
                all.sort_by(|a, b| a.identity.cmp(&b.identity));
                let _ = reply.send(all);
            }
        }
    }

    async fn set_on_off(
        &mut self,
        identity: &DeviceIdentity,
        state: bool,
    ) -> Result<(), BridgeError> {
        if !self.lookup(identity)?.supports(ChannelKind::OnOff) {
            tracing::debug!(%identity, "set_on_off on a device without on/off channel ignored");
            return Ok(());
        }
        self.bus.set_state(identity, state).await?;
        let notification = self
            .registry
            .get_mut(identity)
            .and_then(|record| record.send_on_off(state));
        publish_all(&self.platform, notification).await;
        Ok(())
    }

    async fn toggle_on_off(&mut self, identity: &DeviceIdentity) -> Result<(), BridgeError> {
        if !self.lookup(identity)?.supports(ChannelKind::OnOff) {
            tracing::debug!(%identity, "toggle on a device without on/off channel ignored");
            return Ok(());
        }
        self.bus.toggle(identity).await?;
        let notification = self
            .registry
            .get_mut(identity)
            .and_then(DeviceRecord::resend_on_off);
        publish_all(&self.platform, notification).await;
        Ok(())
    }

    async fn set_brightness(
        &mut self,
        identity: &DeviceIdentity,
        level: f64,
    ) -> Result<(), BridgeError> {
        if !self.lookup(identity)?.supports(ChannelKind::Brightness) {
            tracing::debug!(
                %identity,
                "set_brightness on a device without brightness channel ignored"
            );
            return Ok(());
        }
        warn_if_out_of_range(identity, level);
        self.bus.set_level(identity, level).await?;
        let notification = self
            .registry
            .get_mut(identity)
            .and_then(|record| record.send_brightness(level));
        publish_all(&self.platform, notification).await;
        Ok(())
    }

    async fn set_name(
        &mut self,
        identity: &DeviceIdentity,
        candidate: &str,
    ) -> Result<String, BridgeError> {
        let record = self
            .registry
            .get_mut(identity)
            .ok_or_else(|| not_found(identity))?;
        let (safe, notification) = record.rename(candidate)?;
        tracing::info!(%identity, name = %safe, "device renamed");
        publish(&self.platform, notification).await;
        Ok(safe)
    }

    async fn press_button(&mut self, identity: &DeviceIdentity) -> Result<(), BridgeError> {
        if self.lookup(identity)?.category() != DeviceCategory::Button {
            tracing::debug!(%identity, "press_button on a non-button device ignored");
            return Ok(());
        }
        self.bus.push_button(identity).await
    }

    async fn poll_hubs_if_due(&mut self) {
        let Some(schedule) = self.hub_poll.as_mut() else {
            return;
        };
        let now = Instant::now();
        if now < schedule.next_due {
            return;
        }
        schedule.next_due = now + schedule.every;

        for hub in &self.hubs {
            tracing::debug!(id = %hub, "periodic hub status poll");
            if let Err(err) = self.bus.poll_status(hub).await {
                tracing::warn!(id = %hub, error = %err, "hub status request failed");
            }
        }
    }

    fn lookup(&self, identity: &DeviceIdentity) -> Result<&DeviceRecord, BridgeError> {
        self.registry
            .get(identity)
            .ok_or_else(|| not_found(identity))
    }

}

/// Borrows only the platform: the loop future must stay `Send` for a bus
/// that is not `Sync`.
async fn publish<P: Platform>(platform: &P, notification: Notification) {
    tracing::debug!(id = %notification.identity, kind = ?notification.kind, "notify");
    if let Err(err) = platform.notify(notification).await {
        tracing::warn!(error = %err, "platform notification failed");
    }
}

async fn publish_all<P: Platform>(
    platform: &P,
    notifications: impl IntoIterator<Item = Notification>,
) {
    for notification in notifications {
        publish(platform, notification).await;
    }
}

fn not_found(identity: &DeviceIdentity) -> BridgeError {
    NotFoundError {
        entity: "Device",
        id: identity.to_string(),
    }
    .into()
}

fn warn_if_out_of_range(identity: &DeviceIdentity, level: f64) {
    if !BrightnessChannel::RANGE.contains(&level) {
        tracing::warn!(%identity, level, "brightness outside 0-100, passing through");
    }
}
