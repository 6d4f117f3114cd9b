//! Common error type shared across the workspace.
//!
//! Every failure in the bridge is local: connection errors are retried,
//! command errors are logged and dropped. [`BridgeError`] exists so the
//! port traits have one type to speak, not to drive control flow.

/// Errors crossing the port boundaries of the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The machine answered with a structured error body.
    #[error("machine API error: {0}")]
    Api(String),

    /// An action endpoint answered with a non-`ok` status.
    #[error("action rejected with status '{0}'")]
    ActionStatus(String),

    /// The underlying HTTP or Socket.IO transport failed.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No live connection to the machine.
    #[error("not connected to the machine")]
    NotConnected,

    /// A response body did not have the expected shape.
    #[error("unexpected response shape from {endpoint}")]
    Shape { endpoint: &'static str },
}

impl BridgeError {
    /// Wrap an arbitrary transport-level error.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_api_error_with_message() {
        let err = BridgeError::Api("profile not found".to_string());
        assert_eq!(err.to_string(), "machine API error: profile not found");
    }

    #[test]
    fn should_display_action_status() {
        let err = BridgeError::ActionStatus("busy".to_string());
        assert_eq!(err.to_string(), "action rejected with status 'busy'");
    }

    #[test]
    fn should_keep_source_of_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BridgeError::transport(io);
        assert_eq!(err.to_string(), "transport error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn should_display_not_connected() {
        assert_eq!(
            BridgeError::NotConnected.to_string(),
            "not connected to the machine"
        );
    }
}
