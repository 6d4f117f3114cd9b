//! # meticulous-adapter-mqtt
//!
//! MQTT adapter — the bridge's outbound voice and inbound ear.
//!
//! ## How it works
//!
//! [`service::MqttService`] owns the rumqttc event loop in a background
//! task: on every broker ConnAck it subscribes to the command wildcard,
//! marks the bridge `online` and notifies the bridge task so discovery and
//! the initial snapshot get (re)published. Inbound publishes on the
//! command prefix are parsed into [`Command`](meticulous_app::commands::Command)s
//! and forwarded over a channel. Connection errors retry with backoff,
//! forever.
//!
//! [`publisher::MqttHandle`] is the cheap-to-clone publishing side,
//! implementing the `StatePublisher` port: availability (retained, with a
//! matching last-will), per-sensor state topics, Home Assistant discovery
//! configs, notifications and health metrics.
//!
//! ## Dependency rule
//! Depends on `meticulous-app` and `meticulous-domain` only.

mod config;
mod error;

pub mod discovery;
pub mod publisher;
pub mod service;
pub mod topics;

pub use config::MqttConfig;
pub use error::MqttError;
