//! Machine port — the narrow slice of the vendor API the bridge consumes.
//!
//! The Meticulous machine exposes a REST API plus a Socket.IO push channel
//! on port 8080. This trait covers exactly the calls the bridge makes; the
//! wire protocol behind it belongs to the machine adapter.

use std::future::Future;

use meticulous_domain::error::BridgeError;

/// A one-shot machine action triggered through the action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    Start,
    Stop,
    Continue,
    Preheat,
    Tare,
}

impl MachineAction {
    /// The action name as it appears in the endpoint path.
    #[must_use]
    pub fn endpoint_name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Continue => "continue",
            Self::Preheat => "preheat",
            Self::Tare => "tare",
        }
    }
}

/// Device identity as reported by the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentity {
    pub name: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
    pub software_version: String,
    pub main_voltage: Option<f64>,
}

impl DeviceIdentity {
    /// Fallback identity used when the machine answers with a shape the
    /// current firmware no longer matches.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: "Meticulous Espresso".to_string(),
            model: "Meticulous Espresso".to_string(),
            serial: "meticulous_espresso".to_string(),
            firmware: "unknown".to_string(),
            software_version: "unknown".to_string(),
            main_voltage: None,
        }
    }
}

/// One entry of the machine's profile listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
}

/// Details of the profile currently loaded on the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDetails {
    pub name: String,
    pub author: Option<String>,
    pub temperature: Option<f64>,
    pub final_weight: Option<f64>,
}

/// Machine settings; absent fields are left untouched on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineSettings {
    pub enable_sounds: Option<bool>,
}

/// A display backlight request in the machine's own value ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessRequest {
    /// Brightness in the backend's `0.0..=1.0` range.
    pub brightness: f64,
    pub interpolation: String,
    pub animation_time_ms: u64,
}

/// Aggregate shot history statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotStatistics {
    pub total_saved_shots: i64,
}

/// The most recent recorded shot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShotRecord {
    pub name: Option<String>,
    pub profile_name: Option<String>,
    pub rating: Option<String>,
    /// Unix timestamp (seconds) of the shot.
    pub timestamp: Option<i64>,
}

/// Client port for the machine's REST + push API.
///
/// Every method maps to one upstream call. Errors are the caller's to log;
/// none of them is fatal to the process.
pub trait MachineClient: Send + Sync {
    /// Fetch device identity (`api/v1/machine`).
    fn device_info(&self) -> impl Future<Output = Result<DeviceIdentity, BridgeError>> + Send;

    /// Trigger a one-shot action (`api/v1/action/{name}`). A non-`ok`
    /// status in the response is an error.
    fn execute_action(
        &self,
        action: MachineAction,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// List stored profiles (`api/v1/profile/list`).
    fn list_profiles(&self)
    -> impl Future<Output = Result<Vec<ProfileSummary>, BridgeError>> + Send;

    /// The last loaded profile (`api/v1/profile/last`), if any.
    fn last_profile(
        &self,
    ) -> impl Future<Output = Result<Option<ProfileDetails>, BridgeError>> + Send;

    /// Focus a profile on the machine UI without starting a shot.
    fn select_profile(
        &self,
        profile_id: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Fetch machine settings (`api/v1/settings`).
    fn settings(&self) -> impl Future<Output = Result<MachineSettings, BridgeError>> + Send;

    /// Apply a partial settings update (`api/v1/settings`).
    fn update_settings(
        &self,
        settings: MachineSettings,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Set the display backlight (`api/v1/machine/backlight`).
    fn set_brightness(
        &self,
        request: BrightnessRequest,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Aggregate shot statistics (`api/v1/history/statistics`).
    fn history_statistics(
        &self,
    ) -> impl Future<Output = Result<ShotStatistics, BridgeError>> + Send;

    /// The most recent shot (`api/v1/history/last`), if any.
    fn last_shot(&self) -> impl Future<Output = Result<Option<ShotRecord>, BridgeError>> + Send;

    /// Whether a firmware update is available (`api/v1/update/status`).
    fn check_for_updates(&self) -> impl Future<Output = Result<bool, BridgeError>> + Send;

    /// Reboot the machine (`api/v1/machine/reboot`).
    fn reboot(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_actions_to_endpoint_names() {
        assert_eq!(MachineAction::Start.endpoint_name(), "start");
        assert_eq!(MachineAction::Stop.endpoint_name(), "stop");
        assert_eq!(MachineAction::Continue.endpoint_name(), "continue");
        assert_eq!(MachineAction::Preheat.endpoint_name(), "preheat");
        assert_eq!(MachineAction::Tare.endpoint_name(), "tare");
    }

    #[test]
    fn should_provide_placeholder_identity() {
        let identity = DeviceIdentity::placeholder();
        assert_eq!(identity.name, "Meticulous Espresso");
        assert_eq!(identity.firmware, "unknown");
        assert_eq!(identity.main_voltage, None);
    }
}
