//! # meticulous-app
//!
//! Application layer of the Meticulous → MQTT bridge: the port traits the
//! adapters implement, the per-event payload builders, the command model,
//! and the [`Bridge`](bridge::Bridge) orchestrator that owns all mutable
//! runtime state.
//!
//! ## Dependency rule
//! Depends only on `meticulous-domain`. Adapters depend on this crate;
//! never the other way around.
//!
//! ## Concurrency model
//! The bridge runs as a single task consuming three mpsc channels (push
//! events, MQTT commands, link notifications). Push callbacks and the MQTT
//! event loop run elsewhere and only ever clone channel senders — no state
//! is shared across tasks.

pub mod bridge;
pub mod commands;
pub mod handlers;
pub mod health;
pub mod ports;
pub mod supervisor;
