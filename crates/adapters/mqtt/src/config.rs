//! MQTT adapter configuration.

use serde::Deserialize;

/// Configuration for the MQTT connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Whether MQTT publishing is enabled at all.
    pub enabled: bool,
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Optional username; both credentials must be set to be used.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "core-mosquitto".to_string(),
            port: 1883,
            username: None,
            password: None,
            keep_alive_secs: 60,
        }
    }
}

impl MqttConfig {
    /// Whether a complete credential pair is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        matches!((&self.username, &self.password), (Some(_), Some(_)))
    }
}
