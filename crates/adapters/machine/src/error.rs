//! Machine adapter error types.

use meticulous_domain::error::BridgeError;

/// Transport-level failures talking to the machine or the Supervisor.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// The HTTP request failed.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The Socket.IO client failed.
    #[error("Socket.IO error")]
    Socket(#[from] rust_socketio::Error),
}

impl From<MachineError> for BridgeError {
    fn from(err: MachineError) -> Self {
        Self::transport(err)
    }
}
