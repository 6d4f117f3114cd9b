//! Push-channel port — lifecycle of the machine's Socket.IO connection.
//!
//! Event delivery does not go through this trait: the adapter forwards
//! events straight into an mpsc channel handed to it at construction.
//! This port only covers what the supervisor loop needs.

use std::future::Future;

use meticulous_domain::error::BridgeError;

/// Lifecycle handle for the push-event channel.
pub trait PushChannel: Send + Sync {
    /// Open the channel. Replaces any previous connection.
    fn connect(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Whether the channel is currently believed to be open.
    fn is_connected(&self) -> bool;

    /// Close the channel, best effort.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;
}
