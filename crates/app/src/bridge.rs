//! The bridge orchestrator.
//!
//! One task owns every piece of mutable runtime state: current displayed
//! state, current profile, the profile catalog, the preheat tracker and
//! the health counters. Push events, MQTT commands and link notifications
//! all arrive over mpsc channels, so nothing here is ever touched from two
//! tasks at once.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use meticulous_domain::event::{EventKind, MachineEvent};
use meticulous_domain::profile::ProfileCatalog;
use meticulous_domain::state::{PreheatTracker, display_state};
use meticulous_domain::value::SensorValue;

use crate::commands::{BrightnessCommand, Command};
use crate::handlers;
use crate::health::ConnectionHealth;
use crate::ports::machine::{
    BrightnessRequest, DeviceIdentity, MachineAction, MachineClient, MachineSettings,
};
use crate::ports::publisher::StatePublisher;
use crate::ports::push::PushChannel;

/// Connectivity notifications from the adapter tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The push channel (re)connected.
    SocketUp,
    /// The push channel is down; `error` is set when a reconnect attempt
    /// just failed.
    SocketDown { error: Option<String> },
    /// The MQTT broker accepted the connection — discovery and the
    /// initial state snapshot should be (re)published.
    MqttConnected,
}

/// Tunables owned by the bridge task.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Interval of the periodic refresh cycle.
    pub refresh_interval: Duration,
    /// Delay before the first refresh, giving the push channel time to
    /// establish.
    pub poll_start_delay: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5 * 60),
            poll_start_delay: Duration::from_secs(10),
        }
    }
}

/// The bridge between the machine and the publisher.
pub struct Bridge<M, P, S> {
    machine: M,
    publisher: P,
    push: S,
    settings: BridgeSettings,
    current_state: String,
    current_profile: Option<String>,
    profiles: ProfileCatalog,
    preheat: PreheatTracker,
    health: ConnectionHealth,
    device: Option<DeviceIdentity>,
}

impl<M, P, S> Bridge<M, P, S>
where
    M: MachineClient,
    P: StatePublisher,
    S: PushChannel,
{
    pub fn new(machine: M, publisher: P, push: S, settings: BridgeSettings) -> Self {
        Self {
            machine,
            publisher,
            push,
            settings,
            current_state: "unknown".to_string(),
            current_profile: None,
            profiles: ProfileCatalog::default(),
            preheat: PreheatTracker::default(),
            health: ConnectionHealth::default(),
            device: None,
        }
    }

    /// The displayed machine state as last published.
    #[must_use]
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// The display name of the profile last seen loaded.
    #[must_use]
    pub fn current_profile(&self) -> Option<&str> {
        self.current_profile.as_deref()
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileCatalog {
        &self.profiles
    }

    #[must_use]
    pub fn health(&self) -> &ConnectionHealth {
        &self.health
    }

    /// One connection cycle: fetch device identity over REST, then try to
    /// open the push channel.
    ///
    /// A REST failure fails the attempt. A push-channel failure only
    /// degrades to poll-only mode — the attempt still succeeds.
    pub async fn connect(&mut self) -> bool {
        match self.machine.device_info().await {
            Ok(identity) => {
                tracing::info!(
                    name = %identity.name,
                    serial = %identity.serial,
                    firmware = %identity.firmware,
                    software = %identity.software_version,
                    "connected to machine"
                );
                self.health.api_up();
                let states = identity_states(&identity, self.health.socket_connected());
                self.device = Some(identity);
                self.publish_states(&states).await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to connect to machine");
                self.health.api_down();
                self.publish_availability(false).await;
                return false;
            }
        }

        match self.push.connect().await {
            Ok(()) => {
                self.health.socket_up();
                tracing::info!("push channel connected, real-time updates enabled");
            }
            Err(err) => {
                self.health.socket_down();
                tracing::warn!(%err, "push channel connection failed, continuing in polling mode");
            }
        }

        self.publish_availability(true).await;
        self.refresh_catalog().await;
        true
    }

    /// Run until shutdown, consuming the three inbound channels and
    /// driving the periodic refresh cycle.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<MachineEvent>,
        mut commands: mpsc::Receiver<Command>,
        mut links: mpsc::Receiver<LinkEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let first_tick = tokio::time::Instant::now() + self.settings.poll_start_delay;
        let mut refresh = tokio::time::interval_at(first_tick, self.settings.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(event) = events.recv() => self.handle_event(event).await,
                Some(command) = commands.recv() => self.handle_command(command).await,
                Some(link) = links.recv() => self.handle_link(link).await,
                _ = refresh.tick() => self.periodic_refresh().await,
            }
        }

        self.publish_availability(false).await;
        self.push.disconnect().await;
        tracing::info!("bridge stopped");
    }

    /// Dispatch one push event.
    pub async fn handle_event(&mut self, event: MachineEvent) {
        match event.kind {
            EventKind::Status => self.handle_status(&event.payload).await,
            EventKind::Temperature => {
                let states = handlers::temperature_payload(&event.payload);
                self.publish_states(&states).await;
            }
            EventKind::ProfileChange => {
                tracing::info!(payload = %event.payload, "profile change event");
                self.refresh_profile_info().await;
                self.refresh_catalog().await;
            }
            EventKind::Notification => {
                let message = handlers::notification_message(&event.payload);
                tracing::warn!(%message, "machine notification");
                if let Err(err) = self
                    .publisher
                    .publish_notification("Meticulous Espresso", &message)
                    .await
                {
                    tracing::warn!(%err, "notification publish failed");
                }
            }
            EventKind::SettingsChange => {
                let states = handlers::settings_payload(&event.payload);
                self.publish_states(&states).await;
            }
            EventKind::Button => {
                tracing::info!(payload = %event.payload, "button event");
            }
            EventKind::Communication | EventKind::Actuators | EventKind::MachineInfo => {
                tracing::debug!(kind = %event.kind, payload = %event.payload, "machine event");
            }
        }
    }

    async fn handle_status(&mut self, payload: &Value) {
        let digest = handlers::digest_status(payload);

        let mut states = digest.readings;
        if let Some(countdown) = digest.preheat_countdown {
            self.preheat.record(countdown);
            states.push((
                "preheat_countdown".to_string(),
                SensorValue::Float(handlers::round_countdown(countdown)),
            ));
        }

        let displayed = display_state(&digest.raw_state, self.preheat.is_active());
        if displayed != self.current_state {
            tracing::info!(
                from = %self.current_state,
                to = %displayed,
                "machine state changed"
            );
            self.current_state.clone_from(&displayed);
        }
        states.push(("state".to_string(), SensorValue::Text(displayed)));

        if let Some(profile) = &digest.loaded_profile
            && self.current_profile.as_deref() != Some(profile.as_str())
        {
            tracing::info!(
                from = self.current_profile.as_deref().unwrap_or("none"),
                to = %profile,
                "loaded profile changed"
            );
            self.current_profile = Some(profile.clone());
            self.refresh_profile_info().await;
        }

        if digest.extracting {
            tracing::debug!(state = %self.current_state, "brewing in progress");
        }

        self.publish_states(&states).await;
    }

    /// Dispatch one inbound command.
    ///
    /// Recognized commands never propagate errors; without a machine
    /// connection they log and return early.
    pub async fn handle_command(&mut self, command: Command) {
        if !self.health.api_connected() {
            tracing::warn!(?command, "ignoring command, machine not connected");
            return;
        }
        match command {
            Command::StartBrew => self.run_action(MachineAction::Start, "start_brew").await,
            Command::StopBrew => self.run_action(MachineAction::Stop, "stop_brew").await,
            Command::ContinueBrew => {
                self.run_action(MachineAction::Continue, "continue_brew")
                    .await;
            }
            Command::Preheat => self.run_action(MachineAction::Preheat, "preheat").await,
            Command::TareScale => self.run_action(MachineAction::Tare, "tare_scale").await,
            Command::RebootMachine => match self.machine.reboot().await {
                Ok(()) => tracing::info!("reboot_machine: success"),
                Err(err) => tracing::error!(%err, "reboot_machine failed"),
            },
            Command::LoadProfile { name } => self.load_profile(&name).await,
            Command::SetBrightness(cmd) => self.set_brightness(cmd).await,
            Command::EnableSounds { enabled } => self.enable_sounds(enabled).await,
        }
    }

    async fn run_action(&self, action: MachineAction, label: &str) {
        match self.machine.execute_action(action).await {
            Ok(()) => tracing::info!(command = label, "success"),
            Err(err) => tracing::error!(command = label, %err, "command failed"),
        }
    }

    async fn load_profile(&mut self, name: &str) {
        let Some(id) = self.profiles.id_for_name(name) else {
            tracing::error!(profile = name, "load_profile: unknown profile name");
            return;
        };
        let id = id.to_string();
        match self.machine.select_profile(&id).await {
            Ok(()) => tracing::info!(profile = name, "load_profile: profile selected"),
            Err(err) => tracing::error!(profile = name, %err, "load_profile failed"),
        }
    }

    async fn set_brightness(&mut self, cmd: BrightnessCommand) {
        let percent = cmd.brightness;
        let request = BrightnessRequest {
            brightness: f64::from(percent) / 100.0,
            interpolation: cmd.interpolation.unwrap_or_else(|| "curve".to_string()),
            animation_time_ms: cmd.animation_time_ms.unwrap_or(500),
        };
        match self.machine.set_brightness(request).await {
            Ok(()) => {
                tracing::info!(brightness = percent, "set_brightness: success");
                let states = [(
                    "brightness".to_string(),
                    SensorValue::Int(i64::from(percent)),
                )];
                self.publish_states(&states).await;
            }
            Err(err) => tracing::error!(%err, "set_brightness failed"),
        }
    }

    async fn enable_sounds(&mut self, enabled: bool) {
        let update = MachineSettings {
            enable_sounds: Some(enabled),
        };
        match self.machine.update_settings(update).await {
            Ok(()) => {
                tracing::info!(enabled, "enable_sounds: success");
                self.refresh_settings().await;
            }
            Err(err) => tracing::error!(%err, "enable_sounds failed"),
        }
    }

    /// Apply a connectivity notification.
    pub async fn handle_link(&mut self, link: LinkEvent) {
        match link {
            LinkEvent::SocketUp => {
                if !self.health.socket_connected() {
                    tracing::info!("push channel reconnected");
                }
                self.health.socket_up();
                self.publish_availability(true).await;
            }
            LinkEvent::SocketDown { error } => {
                let was_connected = self.health.socket_connected();
                match error {
                    Some(err) => self.health.record_reconnect_failure(&err),
                    None => self.health.socket_down(),
                }
                if was_connected {
                    tracing::warn!("push channel lost");
                    self.publish_availability(false).await;
                }
            }
            LinkEvent::MqttConnected => {
                tracing::info!("MQTT broker connected, publishing discovery and initial state");
                self.publish_availability(true).await;
                self.publish_discovery().await;
                self.initial_snapshot().await;
            }
        }
    }

    /// One periodic refresh cycle.
    pub async fn periodic_refresh(&mut self) {
        if !self.health.socket_connected() {
            self.refresh_profile_info().await;
        }
        if self.profiles.is_empty() {
            self.refresh_catalog().await;
        }
        self.refresh_settings().await;
        self.refresh_statistics().await;
        self.refresh_update_status().await;
        self.publish_health().await;
    }

    /// Publish the first full snapshot so entities materialize at once
    /// instead of waiting for push events.
    pub async fn initial_snapshot(&mut self) {
        if let Some(identity) = &self.device {
            let states = identity_states(identity, self.health.socket_connected());
            self.publish_states(&states).await;
        }
        self.refresh_statistics().await;
        self.refresh_update_status().await;
        self.refresh_profile_info().await;
        self.refresh_settings().await;
        tracing::info!("published initial state snapshot");
    }

    /// Re-fetch the profile listing; republish discovery when it changed.
    pub async fn refresh_catalog(&mut self) {
        let listing = match self.machine.list_profiles().await {
            Ok(listing) => listing,
            Err(err) => {
                tracing::error!(%err, "failed to fetch profiles");
                return;
            }
        };
        let diff = self
            .profiles
            .replace(listing.into_iter().map(|p| (p.id, p.name)));
        tracing::info!(count = self.profiles.len(), "fetched available profiles");
        if diff.changed {
            if diff.added > 0 || diff.removed > 0 {
                tracing::info!(
                    added = diff.added,
                    removed = diff.removed,
                    "profile list changed"
                );
            }
            self.publish_discovery().await;
        }
    }

    async fn refresh_profile_info(&mut self) {
        match self.machine.last_profile().await {
            Ok(Some(profile)) => {
                let changed = self.current_profile.as_deref() != Some(profile.name.as_str());
                self.current_profile = Some(profile.name.clone());

                let mut states = vec![(
                    "active_profile".to_string(),
                    SensorValue::Text(profile.name.clone()),
                )];
                if let Some(author) = profile.author {
                    states.push(("profile_author".to_string(), SensorValue::Text(author)));
                }
                if let Some(temperature) = profile.temperature {
                    states.push((
                        "target_temperature".to_string(),
                        SensorValue::Float(temperature),
                    ));
                }
                if let Some(weight) = profile.final_weight {
                    states.push(("target_weight".to_string(), SensorValue::Float(weight)));
                }
                self.publish_states(&states).await;

                if changed {
                    tracing::info!(profile = %profile.name, "profile changed");
                }
            }
            Ok(None) => tracing::warn!("no profile data in response"),
            Err(err) => tracing::error!(%err, "failed to fetch last profile"),
        }
    }

    async fn refresh_settings(&mut self) {
        match self.machine.settings().await {
            Ok(settings) => {
                if let Some(enabled) = settings.enable_sounds {
                    let states = [("sounds_enabled".to_string(), SensorValue::Bool(enabled))];
                    self.publish_states(&states).await;
                    tracing::debug!(sounds = enabled, "updated settings");
                }
            }
            Err(err) => tracing::debug!(%err, "could not retrieve settings"),
        }
    }

    async fn refresh_statistics(&mut self) {
        match self.machine.history_statistics().await {
            Ok(stats) => {
                let states = [(
                    "total_shots".to_string(),
                    SensorValue::Int(stats.total_saved_shots),
                )];
                self.publish_states(&states).await;
                tracing::debug!(total = stats.total_saved_shots, "updated statistics");
            }
            Err(err) => tracing::debug!(%err, "could not retrieve statistics"),
        }

        match self.machine.last_shot().await {
            Ok(Some(shot)) => {
                let mut states = vec![
                    (
                        "last_shot_name".to_string(),
                        SensorValue::from(shot.name.as_deref().unwrap_or("Unknown")),
                    ),
                    (
                        "last_shot_rating".to_string(),
                        SensorValue::from(shot.rating.as_deref().unwrap_or("none")),
                    ),
                ];
                if let Some(profile) = shot.profile_name {
                    states.push(("last_shot_profile".to_string(), SensorValue::Text(profile)));
                }
                if let Some(at) = shot.timestamp.and_then(|ts| {
                    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0)
                }) {
                    states.push((
                        "last_shot_time".to_string(),
                        SensorValue::Text(at.to_rfc3339()),
                    ));
                }
                self.publish_states(&states).await;
            }
            Ok(None) => {}
            Err(err) => tracing::debug!(%err, "could not retrieve last shot"),
        }
    }

    async fn refresh_update_status(&mut self) {
        match self.machine.check_for_updates().await {
            Ok(available) => {
                let states = [(
                    "firmware_update_available".to_string(),
                    SensorValue::Bool(available),
                )];
                self.publish_states(&states).await;
                tracing::debug!(available, "published firmware update availability");
            }
            Err(err) => tracing::debug!(%err, "could not check for updates"),
        }
    }

    async fn publish_discovery(&self) {
        let device = self
            .device
            .clone()
            .unwrap_or_else(DeviceIdentity::placeholder);
        if let Err(err) = self
            .publisher
            .publish_discovery(&device, &self.profiles)
            .await
        {
            tracing::warn!(%err, "discovery publish failed");
        }
    }

    async fn publish_health(&self) {
        let report = self.health.report();
        if let Err(err) = self.publisher.publish_health(&report).await {
            tracing::warn!(%err, "health publish failed");
        }
        tracing::debug!(
            uptime = report.uptime_seconds,
            reconnects = report.reconnect_count,
            "published health metrics"
        );
    }

    async fn publish_states(&self, states: &[(String, SensorValue)]) {
        if states.is_empty() {
            return;
        }
        if let Err(err) = self.publisher.publish_states(states).await {
            tracing::warn!(%err, "state publish failed");
        }
    }

    async fn publish_availability(&self, online: bool) {
        if let Err(err) = self.publisher.publish_availability(online).await {
            tracing::warn!(%err, "availability publish failed");
        }
    }
}

fn identity_states(identity: &DeviceIdentity, socket_connected: bool) -> Vec<(String, SensorValue)> {
    let mut states = vec![
        (
            "firmware_version".to_string(),
            SensorValue::from(identity.firmware.as_str()),
        ),
        (
            "software_version".to_string(),
            SensorValue::from(identity.software_version.as_str()),
        ),
        (
            "model".to_string(),
            SensorValue::from(identity.model.as_str()),
        ),
        (
            "serial".to_string(),
            SensorValue::from(identity.serial.as_str()),
        ),
        (
            "name".to_string(),
            SensorValue::from(identity.name.as_str()),
        ),
        ("connected".to_string(), SensorValue::Bool(socket_connected)),
    ];
    if let Some(voltage) = identity.main_voltage {
        states.push(("voltage".to_string(), SensorValue::Float(voltage)));
    }
    states
}
