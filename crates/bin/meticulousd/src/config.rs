//! Configuration loading — the add-on's JSON options file.
//!
//! Home Assistant writes the user's options to `/data/options.json` as a
//! flat JSON object. Every field has a default so a partial file works;
//! the path can be overridden with `METICULOUSD_OPTIONS` for local runs.
//! Loaded once at startup; changing options requires a restart.

use std::time::Duration;

use serde::Deserialize;

use meticulous_adapter_machine::MachineConfig;
use meticulous_adapter_machine::supervisor::MqttCredentials;
use meticulous_adapter_mqtt::MqttConfig;
use meticulous_domain::backoff::Backoff;

/// Default options path inside the add-on container.
const DEFAULT_PATH: &str = "/data/options.json";

/// Top-level add-on configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Machine IP address or hostname.
    pub machine_ip: String,
    /// Heartbeat refresh interval in minutes.
    pub refresh_rate_minutes: u64,
    /// Initial reconnect backoff in seconds.
    pub retry_initial: u64,
    /// Backoff cap in seconds.
    pub retry_max: u64,
    /// Whether backoff delays are jittered.
    pub retry_jitter: bool,
    /// Whether MQTT publishing is enabled.
    pub mqtt_enabled: bool,
    /// MQTT broker hostname.
    pub mqtt_host: String,
    /// MQTT broker port.
    pub mqtt_port: u16,
    /// Optional MQTT username.
    pub mqtt_username: Option<String>,
    /// Optional MQTT password.
    pub mqtt_password: Option<String>,
    /// Debug logging switch.
    pub debug: Option<bool>,
    /// Legacy log level (`trace`..`error`), used when `debug` is absent.
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            machine_ip: String::new(),
            refresh_rate_minutes: 5,
            retry_initial: 2,
            retry_max: 60,
            retry_jitter: true,
            mqtt_enabled: true,
            mqtt_host: "core-mosquitto".to_string(),
            mqtt_port: 1883,
            mqtt_username: None,
            mqtt_password: None,
            debug: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Load the options file (env-overridable path), scrub placeholder
    /// values and validate.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but is malformed, or when
    /// validation fails (no usable machine address).
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("METICULOUSD_OPTIONS").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Scrub obvious template values left in the options form.
    fn normalize(&mut self) {
        let trimmed = self.machine_ip.trim().to_string();
        if trimmed.to_lowercase().starts_with("example") || trimmed.contains(' ') {
            self.machine_ip = String::new();
        } else {
            self.machine_ip = trimmed;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.machine_ip.is_empty() {
            return Err(ConfigError::Validation(
                "machine_ip must be set (e.g. 192.168.x.x or meticulous.local)".to_string(),
            ));
        }
        if self.refresh_rate_minutes == 0 {
            return Err(ConfigError::Validation(
                "refresh_rate_minutes must be at least 1".to_string(),
            ));
        }
        if self.retry_initial == 0 {
            return Err(ConfigError::Validation(
                "retry_initial must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// The tracing filter derived from `debug` (preferred) or the legacy
    /// `log_level` field. `RUST_LOG` takes precedence over both.
    #[must_use]
    pub fn log_filter(&self) -> String {
        if let Some(debug) = self.debug {
            return if debug { "debug" } else { "info" }.to_string();
        }
        match self.log_level.as_deref().map(str::to_lowercase).as_deref() {
            Some(level @ ("trace" | "debug" | "info" | "warn" | "error")) => level.to_string(),
            _ => "info".to_string(),
        }
    }

    #[must_use]
    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            host: self.machine_ip.clone(),
            ..MachineConfig::default()
        }
    }

    #[must_use]
    pub fn mqtt_config(&self) -> MqttConfig {
        MqttConfig {
            enabled: self.mqtt_enabled,
            host: self.mqtt_host.clone(),
            port: self.mqtt_port,
            username: self.mqtt_username.clone(),
            password: self.mqtt_password.clone(),
            ..MqttConfig::default()
        }
    }

    /// Adopt broker coordinates fetched from the Supervisor.
    pub fn adopt_credentials(&mut self, credentials: MqttCredentials) {
        if let Some(host) = credentials.host {
            self.mqtt_host = host;
        }
        if let Some(port) = credentials.port {
            self.mqtt_port = port;
        }
        self.mqtt_username = credentials.username;
        self.mqtt_password = credentials.password;
    }

    /// A fresh backoff calculator with the configured retry parameters.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_secs(self.retry_initial),
            Duration::from_secs(self.retry_max),
            self.retry_jitter,
        )
    }

    /// The heartbeat refresh interval.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_rate_minutes * 60)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parse failure.
    #[error("failed to parse options file")]
    Parse(#[from] serde_json::Error),
    /// File I/O failure.
    #[error("failed to read options file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
