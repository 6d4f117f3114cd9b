//! # meticulous-adapter-machine
//!
//! Machine adapter — everything that talks to the Meticulous espresso
//! machine and the Home Assistant Supervisor.
//!
//! ## How it works
//!
//! The machine exposes a REST API and a Socket.IO push channel on port
//! 8080. [`rest::MeticulousClient`] implements the `MachineClient` port
//! over reqwest; [`socket::SocketHandle`] owns the push connection and
//! forwards every named event into an mpsc channel — callbacks run on the
//! socket client's own task and never touch bridge state directly.
//! [`supervisor`] fetches MQTT broker credentials from the Supervisor API
//! when the add-on configuration carries none.
//!
//! ## Dependency rule
//! Depends on `meticulous-app` and `meticulous-domain` only.

mod config;
mod error;

pub mod rest;
pub mod socket;
pub mod supervisor;

pub use config::MachineConfig;
pub use error::MachineError;
