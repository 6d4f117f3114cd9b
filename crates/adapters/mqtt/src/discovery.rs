//! Home Assistant discovery payload builders.
//!
//! Pure functions from the static entity tables to `(topic, payload)`
//! pairs, using HA's abbreviated config keys (`uniq_id`, `stat_t`,
//! `cmd_t`, `avty_t`, `dev`). Everything is retained and idempotent —
//! republishing the same config is harmless.

use meticulous_app::ports::machine::DeviceIdentity;
use serde_json::{Value, json};

use crate::topics::{
    self, CommandSpec, EntityKind, SLUG, SensorSpec, availability_topic, command_topic,
    config_topic, state_topic,
};

/// The shared device object every discovery config carries.
#[must_use]
pub fn device_object(identity: &DeviceIdentity) -> Value {
    let mut identifiers = vec![SLUG.to_string()];
    if !identity.serial.is_empty() {
        identifiers.push(identity.serial.clone());
    }
    json!({
        "identifiers": identifiers,
        "manufacturer": "Meticulous",
        "model": identity.model,
        "name": identity.name,
        "sw_version": identity.software_version,
        "hw_version": identity.model,
    })
}

/// Discovery config for a plain sensor entity.
///
/// Returns `None` for table entries that are not published as sensors
/// (the profile select is built by [`select_config`]).
#[must_use]
pub fn sensor_config(spec: &SensorSpec, device: &Value) -> Option<(String, Value)> {
    if spec.component == "select" {
        return None;
    }

    let object_id = format!("{SLUG}_{}", spec.key);
    let mut payload = json!({
        "name": spec.name,
        "uniq_id": object_id,
        "stat_t": state_topic(spec.key),
        "avty_t": availability_topic(),
        "dev": device,
    });
    if let Some(device_class) = spec.device_class {
        payload["dev_cla"] = json!(device_class);
    }
    if let Some(unit) = spec.unit {
        payload["unit_of_meas"] = json!(unit);
    }
    match spec.component {
        "binary_sensor" => {
            payload["pl_on"] = json!("true");
            payload["pl_off"] = json!("false");
        }
        // The brightness number is a combined sensor + control entity.
        "number" => {
            if let Some(command) = topics::command_spec("set_brightness") {
                payload["cmd_t"] = json!(command_topic(command.key));
                payload["icon"] = json!(command.icon);
                if let EntityKind::Number { min, max } = command.kind {
                    payload["min"] = json!(min);
                    payload["max"] = json!(max);
                }
            }
        }
        _ => {}
    }

    Some((config_topic(spec.component, spec.key), payload))
}

/// Discovery config for a command entity (button, switch or number).
///
/// Returns `None` for `set_brightness`, which is folded into the
/// combined brightness number entity.
#[must_use]
pub fn command_config(spec: &CommandSpec, device: &Value) -> Option<(String, Value)> {
    if spec.key == "set_brightness" {
        return None;
    }

    let object_id = format!("{SLUG}_{}", spec.key);
    let component = match spec.kind {
        EntityKind::Button => "button",
        EntityKind::Switch => "switch",
        EntityKind::Number { .. } => "number",
    };
    let mut payload = json!({
        "name": spec.name,
        "uniq_id": object_id,
        "cmd_t": command_topic(spec.key),
        "avty_t": availability_topic(),
        "dev": device,
        "icon": spec.icon,
    });
    match spec.kind {
        EntityKind::Button => {
            payload["payload_press"] = json!("1");
        }
        EntityKind::Switch => {
            payload["payload_on"] = json!("true");
            payload["payload_off"] = json!("false");
        }
        EntityKind::Number { min, max } => {
            payload["min"] = json!(min);
            payload["max"] = json!(max);
        }
    }

    Some((config_topic(component, spec.key), payload))
}

/// Discovery config for the profile select entity.
///
/// The options list must mirror the current profile catalog; the caller
/// republishes whenever the catalog changes.
#[must_use]
pub fn select_config(options: &[&str], device: &Value) -> (String, Value) {
    let object_id = format!("{SLUG}_active_profile");
    let payload = json!({
        "name": "Active Profile",
        "uniq_id": object_id,
        "cmd_t": command_topic("load_profile"),
        "stat_t": state_topic("active_profile"),
        "avty_t": availability_topic(),
        "dev": device,
        "icon": "mdi:coffee",
        "options": options,
    });
    (config_topic("select", "active_profile"), payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::{COMMANDS, SENSORS};

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            name: "Meticulous".to_string(),
            model: "v10".to_string(),
            serial: "MET-1".to_string(),
            firmware: "3.1".to_string(),
            software_version: "1.2.3".to_string(),
            main_voltage: Some(230.0),
        }
    }

    #[test]
    fn should_build_device_object_with_serial_identifier() {
        let device = device_object(&identity());
        assert_eq!(
            device["identifiers"],
            json!(["meticulous_espresso", "MET-1"])
        );
        assert_eq!(device["manufacturer"], "Meticulous");
        assert_eq!(device["sw_version"], "1.2.3");
    }

    #[test]
    fn should_omit_empty_serial_from_identifiers() {
        let mut identity = identity();
        identity.serial = String::new();
        let device = device_object(&identity);
        assert_eq!(device["identifiers"], json!(["meticulous_espresso"]));
    }

    #[test]
    fn should_build_temperature_sensor_config_with_class_and_unit() {
        let device = device_object(&identity());
        let spec = topics::sensor_spec("boiler_temperature").unwrap();
        let (topic, payload) = sensor_config(spec, &device).unwrap();
        assert_eq!(
            topic,
            "homeassistant/sensor/meticulous_espresso_boiler_temperature/config"
        );
        assert_eq!(payload["dev_cla"], "temperature");
        assert_eq!(payload["unit_of_meas"], "°C");
        assert_eq!(
            payload["stat_t"],
            "meticulous_espresso/sensor/boiler_temperature/state"
        );
        assert_eq!(payload["avty_t"], "meticulous_espresso/availability");
    }

    #[test]
    fn should_give_binary_sensors_explicit_payloads() {
        let device = device_object(&identity());
        let spec = topics::sensor_spec("brewing").unwrap();
        let (_, payload) = sensor_config(spec, &device).unwrap();
        assert_eq!(payload["pl_on"], "true");
        assert_eq!(payload["pl_off"], "false");
    }

    #[test]
    fn should_fold_brightness_into_a_combined_number_entity() {
        let device = device_object(&identity());
        let spec = topics::sensor_spec("brightness").unwrap();
        let (topic, payload) = sensor_config(spec, &device).unwrap();
        assert_eq!(
            topic,
            "homeassistant/number/meticulous_espresso_brightness/config"
        );
        assert_eq!(
            payload["cmd_t"],
            "meticulous_espresso/command/set_brightness"
        );
        assert_eq!(
            payload["stat_t"],
            "meticulous_espresso/sensor/brightness/state"
        );
        assert_eq!(payload["min"], 0);
        assert_eq!(payload["max"], 100);
        assert_eq!(payload["unit_of_meas"], "%");
    }

    #[test]
    fn should_skip_the_select_in_sensor_configs() {
        let device = device_object(&identity());
        let spec = topics::sensor_spec("active_profile").unwrap();
        assert!(sensor_config(spec, &device).is_none());
    }

    #[test]
    fn should_build_button_configs_with_press_payload() {
        let device = device_object(&identity());
        let spec = topics::command_spec("start_brew").unwrap();
        let (topic, payload) = command_config(spec, &device).unwrap();
        assert_eq!(
            topic,
            "homeassistant/button/meticulous_espresso_start_brew/config"
        );
        assert_eq!(
            payload["cmd_t"],
            "meticulous_espresso/command/start_brew"
        );
        assert_eq!(payload["payload_press"], "1");
        assert_eq!(payload["icon"], "mdi:play");
    }

    #[test]
    fn should_build_switch_configs_with_on_off_payloads() {
        let device = device_object(&identity());
        let spec = topics::command_spec("enable_sounds").unwrap();
        let (topic, payload) = command_config(spec, &device).unwrap();
        assert_eq!(
            topic,
            "homeassistant/switch/meticulous_espresso_enable_sounds/config"
        );
        assert_eq!(payload["payload_on"], "true");
        assert_eq!(payload["payload_off"], "false");
    }

    #[test]
    fn should_skip_set_brightness_in_command_configs() {
        let device = device_object(&identity());
        let spec = topics::command_spec("set_brightness").unwrap();
        assert!(command_config(spec, &device).is_none());
    }

    #[test]
    fn should_list_catalog_names_as_select_options() {
        let device = device_object(&identity());
        let (topic, payload) = select_config(&["Espresso", "Americano"], &device);
        assert_eq!(
            topic,
            "homeassistant/select/meticulous_espresso_active_profile/config"
        );
        assert_eq!(payload["options"], json!(["Espresso", "Americano"]));
        assert_eq!(
            payload["cmd_t"],
            "meticulous_espresso/command/load_profile"
        );
        assert_eq!(
            payload["stat_t"],
            "meticulous_espresso/sensor/active_profile/state"
        );
    }

    #[test]
    fn should_produce_a_config_for_every_table_entry() {
        let device = device_object(&identity());
        let sensors = SENSORS
            .iter()
            .filter(|spec| spec.component != "select")
            .filter(|spec| sensor_config(spec, &device).is_some())
            .count();
        assert_eq!(sensors, SENSORS.len() - 1);

        let commands = COMMANDS
            .iter()
            .filter(|spec| spec.key != "set_brightness")
            .filter(|spec| command_config(spec, &device).is_some())
            .count();
        assert_eq!(commands, COMMANDS.len() - 1);
    }
}
