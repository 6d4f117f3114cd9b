//! REST client for the machine API.
//!
//! Response bodies are parsed as raw JSON and picked apart with the
//! tolerant field accessors: firmware revisions drift, and a missing
//! field must degrade to a default, never fail the call. A body carrying
//! an `error` field is the machine's structured error and surfaces as
//! [`BridgeError::Api`].

use std::time::Duration;

use serde_json::{Value, json};

use meticulous_app::ports::machine::{
    BrightnessRequest, DeviceIdentity, MachineAction, MachineClient, MachineSettings,
    ProfileDetails, ProfileSummary, ShotRecord, ShotStatistics,
};
use meticulous_domain::error::BridgeError;
use meticulous_domain::event::{bool_field, f64_field, field, i64_field, str_field};

use crate::config::MachineConfig;
use crate::error::MachineError;
use crate::socket::SocketHandle;

/// REST client for the machine, plus the socket handle used for the
/// profile-focus emit.
#[derive(Clone)]
pub struct MeticulousClient {
    http: reqwest::Client,
    base_url: String,
    socket: SocketHandle,
}

impl MeticulousClient {
    /// Build a client for the configured machine.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &MachineConfig, socket: SocketHandle) -> Result<Self, MachineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            socket,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET an endpoint and surface structured machine errors.
    async fn get_json(&self, path: &'static str) -> Result<Value, BridgeError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(MachineError::from)?;
        parse_body(response).await
    }

    /// POST a JSON body, succeeding on any 2xx response.
    async fn post_ok(&self, path: &'static str, body: Value) -> Result<(), BridgeError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(MachineError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = match response.json::<Value>().await {
            Ok(value) => str_field(&value, "error").map(ToString::to_string),
            Err(_) => None,
        };
        Err(BridgeError::Api(
            message.unwrap_or_else(|| format!("HTTP {status}")),
        ))
    }
}

async fn parse_body(response: reqwest::Response) -> Result<Value, BridgeError> {
    let status = response.status();
    let value: Value = match response.json().await {
        Ok(value) => value,
        Err(err) if status.is_success() => return Err(MachineError::from(err).into()),
        Err(_) => return Err(BridgeError::Api(format!("HTTP {status}"))),
    };
    if let Some(message) = str_field(&value, "error") {
        return Err(BridgeError::Api(message.to_string()));
    }
    if !status.is_success() {
        return Err(BridgeError::Api(format!("HTTP {status}")));
    }
    Ok(value)
}

impl MachineClient for MeticulousClient {
    async fn device_info(&self) -> Result<DeviceIdentity, BridgeError> {
        let value = self.get_json("api/v1/machine").await?;
        // Firmware mismatches drop fields; fall back per field instead of
        // failing the whole connect attempt.
        let placeholder = DeviceIdentity::placeholder();
        Ok(DeviceIdentity {
            name: str_field(&value, "name")
                .unwrap_or(&placeholder.name)
                .to_string(),
            model: str_field(&value, "model")
                .unwrap_or(&placeholder.model)
                .to_string(),
            serial: str_field(&value, "serial")
                .unwrap_or(&placeholder.serial)
                .to_string(),
            firmware: str_field(&value, "firmware")
                .unwrap_or(&placeholder.firmware)
                .to_string(),
            software_version: str_field(&value, "software_version")
                .or_else(|| str_field(&value, "softwareVersion"))
                .unwrap_or(&placeholder.software_version)
                .to_string(),
            main_voltage: f64_field(&value, "mainVoltage"),
        })
    }

    async fn execute_action(&self, action: MachineAction) -> Result<(), BridgeError> {
        let path: &'static str = match action {
            MachineAction::Start => "api/v1/action/start",
            MachineAction::Stop => "api/v1/action/stop",
            MachineAction::Continue => "api/v1/action/continue",
            MachineAction::Preheat => "api/v1/action/preheat",
            MachineAction::Tare => "api/v1/action/tare",
        };
        let value = self.get_json(path).await?;
        let status = str_field(&value, "status").unwrap_or("ok");
        if status == "ok" {
            Ok(())
        } else {
            Err(BridgeError::ActionStatus(status.to_string()))
        }
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>, BridgeError> {
        let value = self.get_json("api/v1/profile/list").await?;
        let Value::Array(entries) = value else {
            return Err(BridgeError::Shape {
                endpoint: "api/v1/profile/list",
            });
        };
        Ok(entries
            .iter()
            .map(|entry| ProfileSummary {
                id: str_field(entry, "id").unwrap_or_default().to_string(),
                name: str_field(entry, "name").unwrap_or("Unknown").to_string(),
            })
            .collect())
    }

    async fn last_profile(&self) -> Result<Option<ProfileDetails>, BridgeError> {
        let value = self.get_json("api/v1/profile/last").await?;
        let Some(profile) = field(&value, "profile").filter(|p| !p.is_null()) else {
            return Ok(None);
        };
        Ok(Some(ProfileDetails {
            name: str_field(profile, "name").unwrap_or("Unknown").to_string(),
            author: str_field(profile, "author").map(ToString::to_string),
            temperature: f64_field(profile, "temperature"),
            final_weight: f64_field(profile, "final_weight"),
        }))
    }

    async fn select_profile(&self, profile_id: &str) -> Result<(), BridgeError> {
        // Focus-only selection through the push channel; loading by id
        // would start a shot.
        self.socket
            .emit(
                "profileHover",
                json!({"id": profile_id, "from": "app", "type": "focus"}),
            )
            .await
    }

    async fn settings(&self) -> Result<MachineSettings, BridgeError> {
        let value = self.get_json("api/v1/settings").await?;
        Ok(MachineSettings {
            enable_sounds: bool_field(&value, "enable_sounds"),
        })
    }

    async fn update_settings(&self, settings: MachineSettings) -> Result<(), BridgeError> {
        let mut body = serde_json::Map::new();
        if let Some(enabled) = settings.enable_sounds {
            body.insert("enable_sounds".to_string(), Value::Bool(enabled));
        }
        self.post_ok("api/v1/settings", Value::Object(body)).await
    }

    async fn set_brightness(&self, request: BrightnessRequest) -> Result<(), BridgeError> {
        self.post_ok(
            "api/v1/machine/backlight",
            json!({
                "brightness": request.brightness,
                "interpolation": request.interpolation,
                "animation_time": request.animation_time_ms,
            }),
        )
        .await
    }

    async fn history_statistics(&self) -> Result<ShotStatistics, BridgeError> {
        let value = self.get_json("api/v1/history/statistics").await?;
        Ok(ShotStatistics {
            total_saved_shots: i64_field(&value, "totalSavedShots").unwrap_or(0),
        })
    }

    async fn last_shot(&self) -> Result<Option<ShotRecord>, BridgeError> {
        let value = self.get_json("api/v1/history/last").await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(ShotRecord {
            name: str_field(&value, "name").map(ToString::to_string),
            profile_name: field(&value, "profile")
                .and_then(|profile| str_field(profile, "name"))
                .map(ToString::to_string),
            rating: str_field(&value, "rating").map(ToString::to_string),
            timestamp: i64_field(&value, "time"),
        }))
    }

    async fn check_for_updates(&self) -> Result<bool, BridgeError> {
        let value = self.get_json("api/v1/update/status").await?;
        Ok(bool_field(&value, "available").unwrap_or(false))
    }

    async fn reboot(&self) -> Result<(), BridgeError> {
        self.post_ok("api/v1/machine/reboot", json!({})).await
    }
}
