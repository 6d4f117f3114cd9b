//! MQTT adapter error types.

use meticulous_domain::error::BridgeError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected the request.
    #[error("MQTT client error")]
    Client(#[from] rumqttc::ClientError),

    /// Failed to serialize an outbound payload.
    #[error("failed to serialize MQTT payload")]
    Serialize(#[from] serde_json::Error),
}

impl From<MqttError> for BridgeError {
    fn from(err: MqttError) -> Self {
        Self::transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_into_transport_bridge_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err: BridgeError = MqttError::from(json_err).into();
        assert!(matches!(err, BridgeError::Transport(_)));
    }

    #[test]
    fn should_display_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err = MqttError::from(json_err);
        assert_eq!(err.to_string(), "failed to serialize MQTT payload");
    }
}
