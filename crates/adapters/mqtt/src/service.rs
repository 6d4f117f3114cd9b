//! The MQTT connection task.
//!
//! Owns the rumqttc event loop for the process lifetime. Broker loss is
//! never fatal: every connection error waits out a backoff delay and polls
//! again. Each successful ConnAck re-subscribes, re-marks availability and
//! tells the bridge to republish discovery and the initial snapshot.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Packet, Publish, QoS};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use meticulous_app::bridge::LinkEvent;
use meticulous_app::commands::Command;
use meticulous_domain::backoff::Backoff;

use crate::config::MqttConfig;
use crate::publisher::MqttHandle;
use crate::topics::{self, SLUG, availability_topic, command_wildcard};

/// The broker-facing half of the adapter.
pub struct MqttService;

impl MqttService {
    /// Spawn the connection task and hand back the publisher handle.
    ///
    /// With MQTT disabled the handle is inert and the task exits
    /// immediately.
    #[must_use]
    pub fn spawn(
        config: &MqttConfig,
        backoff: Backoff,
        commands: mpsc::Sender<Command>,
        links: mpsc::Sender<LinkEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> (MqttHandle, JoinHandle<()>) {
        if !config.enabled {
            tracing::info!("MQTT disabled by configuration");
            return (MqttHandle::disabled(), tokio::spawn(async {}));
        }

        let mut options = MqttOptions::new(SLUG, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        options.set_last_will(LastWill::new(
            availability_topic(),
            "offline",
            QoS::AtMostOnce,
            true,
        ));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        let handle = MqttHandle::new(client.clone());
        let task = tokio::spawn(run_event_loop(
            client, eventloop, backoff, commands, links, shutdown,
        ));
        (handle, task)
    }
}

async fn run_event_loop(
    client: AsyncClient,
    mut eventloop: rumqttc::EventLoop,
    mut backoff: Backoff,
    commands: mpsc::Sender<Command>,
    links: mpsc::Sender<LinkEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    // Repeated failures drop to debug so a dead broker does not flood the
    // logs.
    let mut already_failed = false;

    loop {
        tokio::select! {
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    already_failed = false;
                    backoff.reset();
                    on_connected(&client, &links).await;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    handle_publish(&publish, &commands).await;
                }
                Ok(_) => {}
                Err(err) => {
                    if already_failed {
                        tracing::debug!(%err, "MQTT connection retry failed");
                    } else {
                        tracing::warn!(%err, "MQTT connection failed, will retry");
                        already_failed = true;
                    }
                    let delay = backoff.next_delay();
                    tracing::debug!(
                        attempt = backoff.attempt(),
                        delay_secs = delay.as_secs_f64(),
                        "backing off before next MQTT attempt"
                    );
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        _ = shutdown.changed() => {
                            if *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    // Best-effort clean offline; the last-will covers the unclean case.
    let _ = client
        .publish(availability_topic(), QoS::AtMostOnce, true, "offline")
        .await;
    tracing::debug!("MQTT task stopped");
}

async fn on_connected(client: &AsyncClient, links: &mpsc::Sender<LinkEvent>) {
    tracing::info!("MQTT broker connected");
    if let Err(err) = client.subscribe(command_wildcard(), QoS::AtLeastOnce).await {
        tracing::warn!(%err, "failed to subscribe to command topics");
    } else {
        tracing::info!(topic = %command_wildcard(), "subscribed to MQTT commands");
    }
    if let Err(err) = client
        .publish(availability_topic(), QoS::AtMostOnce, true, "online")
        .await
    {
        tracing::warn!(%err, "failed to publish online status");
    }
    let _ = links.send(LinkEvent::MqttConnected).await;
}

async fn handle_publish(publish: &Publish, commands: &mpsc::Sender<Command>) {
    let Some(suffix) = topics::command_suffix(&publish.topic) else {
        tracing::debug!(topic = %publish.topic, "ignoring non-command MQTT message");
        return;
    };
    let payload = String::from_utf8_lossy(&publish.payload);
    tracing::debug!(topic = %publish.topic, %payload, "MQTT command received");

    match Command::parse(suffix, &payload) {
        Some(command) => {
            let _ = commands.send(command).await;
        }
        None => tracing::warn!(suffix, %payload, "unknown command topic"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publish_on(topic: &str, payload: &str) -> Publish {
        Publish::new(topic, QoS::AtMostOnce, payload)
    }

    #[tokio::test]
    async fn should_forward_parsed_commands() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_publish(
            &publish_on("meticulous_espresso/command/start_brew", "1"),
            &tx,
        )
        .await;
        assert_eq!(rx.recv().await, Some(Command::StartBrew));
    }

    #[tokio::test]
    async fn should_forward_profile_selection_payloads() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_publish(
            &publish_on("meticulous_espresso/command/load_profile", "Espresso"),
            &tx,
        )
        .await;
        assert_eq!(
            rx.recv().await,
            Some(Command::LoadProfile {
                name: "Espresso".to_string()
            })
        );
    }

    #[tokio::test]
    async fn should_drop_unknown_command_suffixes() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_publish(&publish_on("meticulous_espresso/command/make_tea", "1"), &tx).await;
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn should_ignore_non_command_topics() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_publish(
            &publish_on("homeassistant/sensor/meticulous_espresso_state/config", "{}"),
            &tx,
        )
        .await;
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn should_return_inert_handle_when_disabled() {
        let config = MqttConfig {
            enabled: false,
            ..MqttConfig::default()
        };
        let backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(60), false);
        let (commands_tx, _commands_rx) = mpsc::channel(4);
        let (links_tx, _links_rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let (handle, task) =
            MqttService::spawn(&config, backoff, commands_tx, links_tx, shutdown_rx);
        assert!(!handle.is_enabled());
        task.await.unwrap();
    }
}
