//! The publishing side of the MQTT adapter.
//!
//! [`MqttHandle`] implements the `StatePublisher` port over a cloned
//! rumqttc [`AsyncClient`]. When MQTT is disabled it carries no client and
//! every publish is a debug-logged no-op, so the bridge never has to care.

use rumqttc::{AsyncClient, QoS};

use meticulous_app::health::HealthReport;
use meticulous_app::ports::machine::DeviceIdentity;
use meticulous_app::ports::publisher::StatePublisher;
use meticulous_domain::error::BridgeError;
use meticulous_domain::profile::ProfileCatalog;
use meticulous_domain::value::SensorValue;

use crate::discovery;
use crate::error::MqttError;
use crate::topics::{
    self, COMMANDS, SENSORS, availability_topic, health_topic, notification_topic, state_topic,
};

/// Cheap-to-clone publisher handle.
#[derive(Debug, Clone)]
pub struct MqttHandle {
    client: Option<AsyncClient>,
}

impl MqttHandle {
    /// A handle backed by a live client.
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A handle for configurations without a broker: publishes vanish.
    #[must_use]
    pub fn disabled() -> Self {
        Self { client: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    async fn publish(
        &self,
        topic: String,
        payload: String,
        qos: QoS,
        retain: bool,
    ) -> Result<(), MqttError> {
        let Some(client) = &self.client else {
            tracing::debug!(%topic, "MQTT disabled, dropping publish");
            return Ok(());
        };
        client.publish(topic, qos, retain, payload).await?;
        Ok(())
    }
}

impl StatePublisher for MqttHandle {
    async fn publish_states(&self, states: &[(String, SensorValue)]) -> Result<(), BridgeError> {
        let mut published = 0_usize;
        for (key, value) in states {
            // Only keys with a sensor mapping reach MQTT.
            if topics::sensor_spec(key).is_none() {
                continue;
            }
            self.publish(state_topic(key), value.to_string(), QoS::AtMostOnce, false)
                .await
                .map_err(BridgeError::from)?;
            published += 1;
        }
        if published > 0 {
            tracing::debug!(published, "published MQTT state updates");
        }
        Ok(())
    }

    async fn publish_availability(&self, online: bool) -> Result<(), BridgeError> {
        let payload = if online { "online" } else { "offline" };
        self.publish(
            availability_topic(),
            payload.to_string(),
            QoS::AtMostOnce,
            true,
        )
        .await
        .map_err(BridgeError::from)
    }

    async fn publish_discovery(
        &self,
        device: &DeviceIdentity,
        profiles: &ProfileCatalog,
    ) -> Result<(), BridgeError> {
        if !self.is_enabled() {
            tracing::debug!("MQTT disabled, skipping discovery publish");
            return Ok(());
        }

        let device = discovery::device_object(device);
        let mut count = 0_usize;

        for spec in SENSORS {
            if let Some((topic, payload)) = discovery::sensor_config(spec, &device) {
                self.publish(topic, payload.to_string(), QoS::AtLeastOnce, true)
                    .await
                    .map_err(BridgeError::from)?;
                count += 1;
            }
        }

        for spec in COMMANDS {
            if let Some((topic, payload)) = discovery::command_config(spec, &device) {
                self.publish(topic, payload.to_string(), QoS::AtLeastOnce, true)
                    .await
                    .map_err(BridgeError::from)?;
                count += 1;
            }
        }

        // The select only makes sense once the catalog has options.
        if !profiles.is_empty() {
            let (topic, payload) = discovery::select_config(&profiles.names(), &device);
            self.publish(topic, payload.to_string(), QoS::AtLeastOnce, true)
                .await
                .map_err(BridgeError::from)?;
            count += 1;
        }

        tracing::info!(count, "published Home Assistant discovery configs");
        Ok(())
    }

    async fn publish_notification(&self, title: &str, message: &str) -> Result<(), BridgeError> {
        let payload = serde_json::json!({"title": title, "message": message});
        self.publish(
            notification_topic(),
            payload.to_string(),
            QoS::AtMostOnce,
            false,
        )
        .await
        .map_err(BridgeError::from)
    }

    async fn publish_health(&self, report: &HealthReport) -> Result<(), BridgeError> {
        let payload = serde_json::to_string(report).map_err(MqttError::from)?;
        self.publish(health_topic(), payload, QoS::AtMostOnce, false)
            .await
            .map_err(BridgeError::from)
    }
}
