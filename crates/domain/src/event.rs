//! Push-event model and tolerant payload access.
//!
//! The machine's Socket.IO channel delivers nine named events. Payload
//! shapes vary with firmware: a field may arrive as a bare JSON object or
//! wrapped in a one-element argument array, and individual fields come and
//! go between versions. All field access goes through the accessors here
//! so no handler ever has to care.

use serde_json::Value;

/// The named push events the machine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Status,
    Temperature,
    ProfileChange,
    Notification,
    Button,
    SettingsChange,
    Communication,
    Actuators,
    MachineInfo,
}

impl EventKind {
    /// Every event kind, in registration order.
    pub const ALL: [Self; 9] = [
        Self::Status,
        Self::Temperature,
        Self::ProfileChange,
        Self::Notification,
        Self::Button,
        Self::SettingsChange,
        Self::Communication,
        Self::Actuators,
        Self::MachineInfo,
    ];

    /// The Socket.IO event name this kind is registered under.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Temperature => "temperature",
            Self::ProfileChange => "profile_change",
            Self::Notification => "notification",
            Self::Button => "button",
            Self::SettingsChange => "settings_change",
            Self::Communication => "communication",
            Self::Actuators => "actuators",
            Self::MachineInfo => "machine_info",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// One push event as received from the machine, payload untouched.
#[derive(Debug, Clone)]
pub struct MachineEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl MachineEvent {
    #[must_use]
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Look up a field, unwrapping one level of argument-array framing.
#[must_use]
pub fn field<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    match payload {
        Value::Array(items) => items.first().and_then(|inner| field(inner, name)),
        Value::Object(map) => map.get(name),
        _ => None,
    }
}

/// A string field, or `None` when missing or not a string.
#[must_use]
pub fn str_field<'a>(payload: &'a Value, name: &str) -> Option<&'a str> {
    field(payload, name).and_then(Value::as_str)
}

/// A numeric field as `f64` (integers included).
#[must_use]
pub fn f64_field(payload: &Value, name: &str) -> Option<f64> {
    field(payload, name).and_then(Value::as_f64)
}

/// An integer field.
#[must_use]
pub fn i64_field(payload: &Value, name: &str) -> Option<i64> {
    field(payload, name).and_then(Value::as_i64)
}

/// A boolean field.
#[must_use]
pub fn bool_field(payload: &Value, name: &str) -> Option<bool> {
    field(payload, name).and_then(Value::as_bool)
}
