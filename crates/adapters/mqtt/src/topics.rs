//! Topic layout and the static entity tables.
//!
//! Everything the bridge publishes lives under one slug. The sensor table
//! is the single source of truth for which payload keys reach MQTT at
//! all — keys without an entry are silently dropped by the publisher.

/// Topic namespace for every bridge topic.
pub const SLUG: &str = "meticulous_espresso";

/// Home Assistant discovery prefix.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

#[must_use]
pub fn availability_topic() -> String {
    format!("{SLUG}/availability")
}

#[must_use]
pub fn state_topic(key: &str) -> String {
    format!("{SLUG}/sensor/{key}/state")
}

#[must_use]
pub fn command_topic(suffix: &str) -> String {
    format!("{SLUG}/command/{suffix}")
}

#[must_use]
pub fn command_wildcard() -> String {
    format!("{SLUG}/command/#")
}

#[must_use]
pub fn health_topic() -> String {
    format!("{SLUG}/health")
}

#[must_use]
pub fn notification_topic() -> String {
    format!("{SLUG}/notification")
}

#[must_use]
pub fn config_topic(component: &str, key: &str) -> String {
    format!("{DISCOVERY_PREFIX}/{component}/{SLUG}_{key}/config")
}

/// Extract the command suffix from an inbound topic.
#[must_use]
pub fn command_suffix(topic: &str) -> Option<&str> {
    topic
        .strip_prefix(SLUG)
        .and_then(|rest| rest.strip_prefix("/command/"))
}

/// One published sensor entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSpec {
    pub key: &'static str,
    /// Home Assistant component (`sensor`, `binary_sensor`, `number`,
    /// `select`).
    pub component: &'static str,
    pub name: &'static str,
    pub device_class: Option<&'static str>,
    pub unit: Option<&'static str>,
}

const fn sensor(key: &'static str, name: &'static str) -> SensorSpec {
    SensorSpec {
        key,
        component: "sensor",
        name,
        device_class: None,
        unit: None,
    }
}

const fn binary(key: &'static str, name: &'static str) -> SensorSpec {
    SensorSpec {
        key,
        component: "binary_sensor",
        name,
        device_class: None,
        unit: None,
    }
}

const fn measured(
    key: &'static str,
    name: &'static str,
    device_class: Option<&'static str>,
    unit: &'static str,
) -> SensorSpec {
    SensorSpec {
        key,
        component: "sensor",
        name,
        device_class,
        unit: Some(unit),
    }
}

/// Every sensor key the bridge publishes, in discovery order.
pub const SENSORS: &[SensorSpec] = &[
    binary("connected", "Meticulous Connected"),
    sensor("state", "Meticulous State"),
    binary("brewing", "Meticulous Brewing"),
    measured(
        "boiler_temperature",
        "Boiler Temperature",
        Some("temperature"),
        "°C",
    ),
    measured(
        "brew_head_temperature",
        "Brew Head Temperature",
        Some("temperature"),
        "°C",
    ),
    measured(
        "external_temp_1",
        "External Temperature 1",
        Some("temperature"),
        "°C",
    ),
    measured(
        "external_temp_2",
        "External Temperature 2",
        Some("temperature"),
        "°C",
    ),
    measured("pressure", "Pressure", Some("pressure"), "bar"),
    sensor("flow_rate", "Flow Rate"),
    measured("shot_timer", "Shot Timer", None, "s"),
    measured("shot_weight", "Shot Weight", None, "g"),
    measured("preheat_countdown", "Preheat Countdown", None, "s"),
    sensor("total_shots", "Total Shots"),
    sensor("last_shot_name", "Last Shot Name"),
    sensor("last_shot_profile", "Last Shot Profile"),
    sensor("last_shot_rating", "Last Shot Rating"),
    sensor("last_shot_time", "Last Shot Time"),
    SensorSpec {
        key: "active_profile",
        component: "select",
        name: "Active Profile",
        device_class: None,
        unit: None,
    },
    sensor("profile_author", "Profile Author"),
    measured(
        "target_temperature",
        "Target Temperature",
        Some("temperature"),
        "°C",
    ),
    measured("target_weight", "Target Weight", None, "g"),
    sensor("firmware_version", "Firmware Version"),
    sensor("software_version", "Software Version"),
    measured("voltage", "Voltage", Some("voltage"), "V"),
    binary("sounds_enabled", "Sounds Enabled"),
    SensorSpec {
        key: "brightness",
        component: "number",
        name: "Brightness",
        device_class: None,
        unit: Some("%"),
    },
    binary("firmware_update_available", "Firmware Update Available"),
];

/// Look up the spec for a payload key.
#[must_use]
pub fn sensor_spec(key: &str) -> Option<&'static SensorSpec> {
    SENSORS.iter().find(|spec| spec.key == key)
}

/// What kind of Home Assistant entity a command maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Button,
    Switch,
    Number { min: u8, max: u8 },
}

/// One command entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub kind: EntityKind,
}

/// Every command entity, in discovery order.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        key: "start_brew",
        name: "Start Brew",
        icon: "mdi:play",
        kind: EntityKind::Button,
    },
    CommandSpec {
        key: "stop_brew",
        name: "Stop Brew",
        icon: "mdi:stop",
        kind: EntityKind::Button,
    },
    CommandSpec {
        key: "continue_brew",
        name: "Continue Brew",
        icon: "mdi:play-pause",
        kind: EntityKind::Button,
    },
    CommandSpec {
        key: "preheat",
        name: "Preheat",
        icon: "mdi:fire",
        kind: EntityKind::Button,
    },
    CommandSpec {
        key: "tare_scale",
        name: "Tare Scale",
        icon: "mdi:scale",
        kind: EntityKind::Button,
    },
    CommandSpec {
        key: "set_brightness",
        name: "Brightness",
        icon: "mdi:brightness-6",
        kind: EntityKind::Number { min: 0, max: 100 },
    },
    CommandSpec {
        key: "enable_sounds",
        name: "Enable Sounds",
        icon: "mdi:volume-high",
        kind: EntityKind::Switch,
    },
    CommandSpec {
        key: "reboot_machine",
        name: "Reboot Machine",
        icon: "mdi:restart",
        kind: EntityKind::Button,
    },
];

/// Look up a command spec by key.
#[must_use]
pub fn command_spec(key: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.key == key)
}
