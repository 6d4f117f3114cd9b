//! Machine adapter configuration.

use serde::Deserialize;

/// Configuration for the machine connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Machine IP address or hostname (e.g. `192.168.1.20` or
    /// `meticulous.local`).
    pub host: String,
    /// API port.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8080,
            timeout_secs: 10,
        }
    }
}

impl MachineConfig {
    /// The REST and Socket.IO base URL, with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}
