//! Per-event payload builders.
//!
//! Each builder takes one raw push-event payload and produces the flat
//! key → value pairs the publisher understands. All field access goes
//! through the tolerant accessors in `meticulous_domain::event`, so a
//! missing or mistyped field defaults instead of failing.

use meticulous_domain::event::{bool_field, f64_field, field, str_field};
use meticulous_domain::value::SensorValue;
use serde_json::Value;

/// What a status event boils down to.
///
/// `readings` carries everything except the displayed state — the bridge
/// appends that after running the preheat heuristic.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDigest {
    pub raw_state: String,
    pub extracting: bool,
    pub loaded_profile: Option<String>,
    pub preheat_countdown: Option<f64>,
    pub readings: Vec<(String, SensorValue)>,
}

/// Flatten a status event.
#[must_use]
pub fn digest_status(payload: &Value) -> StatusDigest {
    let raw_state = str_field(payload, "state").unwrap_or("unknown").to_string();
    let extracting = bool_field(payload, "extracting").unwrap_or(false);
    let loaded_profile = str_field(payload, "loaded_profile").map(str::to_string);
    // The countdown field name drifted between firmware versions.
    let preheat_countdown =
        f64_field(payload, "preheat").or_else(|| f64_field(payload, "preheat_time_left"));

    let sensors = field(payload, "sensors");
    let sensor = |name: &str| -> f64 {
        sensors.and_then(|s| f64_field(s, name)).unwrap_or(0.0)
    };

    let mut readings: Vec<(String, SensorValue)> = vec![
        ("brewing".to_string(), SensorValue::Bool(extracting)),
        (
            "shot_timer".to_string(),
            SensorValue::Float(f64_field(payload, "profile_time").unwrap_or(0.0) / 1000.0),
        ),
        (
            "elapsed_time".to_string(),
            SensorValue::Float(f64_field(payload, "time").unwrap_or(0.0) / 1000.0),
        ),
        ("pressure".to_string(), SensorValue::Float(sensor("p"))),
        ("flow_rate".to_string(), SensorValue::Float(sensor("f"))),
        ("shot_weight".to_string(), SensorValue::Float(sensor("w"))),
        ("temperature".to_string(), SensorValue::Float(sensor("t"))),
        (
            "active_profile".to_string(),
            SensorValue::from(loaded_profile.as_deref().unwrap_or("None")),
        ),
    ];

    if let Some(setpoints) = field(payload, "setpoints") {
        for (wire, key) in [
            ("temperature", "target_temperature"),
            ("pressure", "target_pressure"),
            ("flow", "target_flow"),
        ] {
            if let Some(value) = f64_field(setpoints, wire) {
                readings.push((key.to_string(), SensorValue::Float(value)));
            }
        }
    }

    StatusDigest {
        raw_state,
        extracting,
        loaded_profile,
        preheat_countdown,
        readings,
    }
}

/// Remap a temperature event. Absent probes are omitted, not zeroed.
#[must_use]
pub fn temperature_payload(payload: &Value) -> Vec<(String, SensorValue)> {
    [
        ("t_bar_up", "boiler_temperature"),
        ("t_bar_down", "brew_head_temperature"),
        ("t_ext_1", "external_temp_1"),
        ("t_ext_2", "external_temp_2"),
    ]
    .into_iter()
    .filter_map(|(wire, key)| {
        f64_field(payload, wire).map(|value| (key.to_string(), SensorValue::Float(value)))
    })
    .collect()
}

/// Remap a settings-change event to the published settings sensors.
#[must_use]
pub fn settings_payload(payload: &Value) -> Vec<(String, SensorValue)> {
    let mut states = Vec::new();
    if let Some(enabled) = bool_field(payload, "enable_sounds") {
        states.push(("sounds_enabled".to_string(), SensorValue::Bool(enabled)));
    }
    if let Some(brightness) = f64_field(payload, "brightness") {
        // Backend range is 0–1; publish the HA percent.
        states.push((
            "brightness".to_string(),
            SensorValue::Float((brightness * 100.0).round()),
        ));
    }
    states
}

/// Extract the notification text, falling back to the raw payload.
#[must_use]
pub fn notification_message(payload: &Value) -> String {
    str_field(payload, "message")
        .map_or_else(|| payload.to_string(), str::to_string)
}

/// Round a preheat countdown the way it is published (2 decimals).
#[must_use]
pub fn round_countdown(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
