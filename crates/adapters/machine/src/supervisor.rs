//! Home Assistant Supervisor credential bootstrap.
//!
//! When the add-on configuration carries no MQTT credentials, the
//! Supervisor's services API can supply broker host, port and a login.
//! Used once at startup; any failure falls back to the configured values.

use std::time::Duration;

use serde_json::Value;

use meticulous_domain::error::BridgeError;
use meticulous_domain::event::{field, i64_field, str_field};

use crate::error::MachineError;

/// Broker coordinates as reported by the Supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MqttCredentials {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fetch MQTT credentials from `http://supervisor/services/mqtt`.
///
/// # Errors
///
/// Returns an error for transport failures or non-2xx responses; the
/// caller logs and keeps its configured values.
pub async fn fetch_mqtt_credentials(token: &str) -> Result<MqttCredentials, BridgeError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(MachineError::from)?;

    let response = client
        .get("http://supervisor/services/mqtt")
        .bearer_auth(token)
        .send()
        .await
        .map_err(MachineError::from)?;

    let status = response.status();
    if !status.is_success() {
        return Err(BridgeError::Api(format!("HTTP {status}")));
    }

    let value: Value = response.json().await.map_err(MachineError::from)?;
    Ok(parse_credentials(&value))
}

fn parse_credentials(value: &Value) -> MqttCredentials {
    let data = field(value, "data").unwrap_or(value);
    MqttCredentials {
        host: str_field(data, "host").map(ToString::to_string),
        port: i64_field(data, "port").and_then(|port| u16::try_from(port).ok()),
        username: str_field(data, "username").map(ToString::to_string),
        password: str_field(data, "password").map(ToString::to_string),
    }
}
