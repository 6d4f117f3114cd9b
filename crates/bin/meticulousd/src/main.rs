//! # meticulousd — the Meticulous → MQTT bridge daemon
//!
//! Composition root that wires the adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load the add-on options file and set up tracing
//! - Bootstrap MQTT credentials from the Supervisor when none are set
//! - Construct the machine client, push channel and MQTT service
//! - Connect to the machine with backoff, forever
//! - Spawn the push-channel supervisor and the bridge task
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no bridge logic belongs here.

mod config;

use std::time::Duration;

use tokio::sync::{mpsc, watch};

use meticulous_adapter_machine::rest::MeticulousClient;
use meticulous_adapter_machine::socket::SocketHandle;
use meticulous_adapter_machine::supervisor::fetch_mqtt_credentials;
use meticulous_adapter_mqtt::service::MqttService;
use meticulous_app::bridge::{Bridge, BridgeSettings};
use meticulous_app::supervisor::supervise_push;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    init_tracing(&config);

    tracing::info!(
        machine_ip = %config.machine_ip,
        refresh_rate_minutes = config.refresh_rate_minutes,
        "starting Meticulous MQTT bridge"
    );

    if config.mqtt_enabled && !config.mqtt_config().has_credentials() {
        bootstrap_credentials(&mut config).await;
    }

    let (events_tx, events_rx) = mpsc::channel(64);
    let (commands_tx, commands_rx) = mpsc::channel(16);
    let (links_tx, links_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (publisher, mqtt_task) = MqttService::spawn(
        &config.mqtt_config(),
        config.backoff(),
        commands_tx,
        links_tx.clone(),
        shutdown_rx.clone(),
    );

    let machine_config = config.machine_config();
    let socket = SocketHandle::new(&machine_config, events_tx);
    let machine = MeticulousClient::new(&machine_config, socket.clone())?;

    let settings = BridgeSettings {
        refresh_interval: config.refresh_interval(),
        poll_start_delay: Duration::from_secs(10),
    };
    let mut bridge = Bridge::new(machine, publisher, socket.clone(), settings);

    // Initial connect, retried with backoff until it works or we are told
    // to stop.
    let mut backoff = config.backoff();
    while !bridge.connect().await {
        let delay = backoff.next_delay();
        tracing::error!(
            attempt = backoff.attempt(),
            retry_in_secs = delay.as_secs_f64(),
            "failed to connect to machine, retrying"
        );
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = shutdown_signal() => {
                let _ = shutdown_tx.send(true);
                let _ = mqtt_task.await;
                return Ok(());
            }
        }
    }

    let supervisor_task = tokio::spawn(supervise_push(
        socket.clone(),
        config.backoff(),
        links_tx,
        shutdown_rx.clone(),
    ));
    let bridge_task = tokio::spawn(bridge.run(events_rx, commands_rx, links_rx, shutdown_rx));

    tracing::info!("bridge running");
    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = bridge_task.await;
    let _ = supervisor_task.await;
    let _ = mqtt_task.await;

    tracing::info!("bridge stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Fetch broker credentials from the Supervisor services API.
async fn bootstrap_credentials(config: &mut Config) {
    let Ok(token) = std::env::var("SUPERVISOR_TOKEN") else {
        tracing::debug!("no supervisor token, keeping configured MQTT settings");
        return;
    };
    match fetch_mqtt_credentials(&token).await {
        Ok(credentials) => {
            tracing::info!(
                host = credentials.host.as_deref().unwrap_or(&config.mqtt_host),
                "retrieved MQTT credentials from Supervisor"
            );
            config.adopt_credentials(credentials);
        }
        Err(err) => {
            tracing::warn!(%err, "could not fetch MQTT credentials from Supervisor");
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
