//! Inbound command model and parsing.
//!
//! Commands arrive as MQTT messages on `<slug>/command/<suffix>`. Parsing
//! is pure: the MQTT adapter hands the suffix and payload over, and an
//! unrecognized or malformed command simply yields `None` (the caller logs
//! and drops it).

use meticulous_domain::event::{f64_field, str_field};
use serde_json::Value;

/// A recognized machine command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartBrew,
    StopBrew,
    ContinueBrew,
    Preheat,
    TareScale,
    RebootMachine,
    /// Focus a profile by display name (never starts a shot).
    LoadProfile { name: String },
    SetBrightness(BrightnessCommand),
    EnableSounds { enabled: bool },
}

/// Brightness command in the public 0–100 range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrightnessCommand {
    pub brightness: u8,
    pub interpolation: Option<String>,
    pub animation_time_ms: Option<u64>,
}

impl Command {
    /// Parse a command from its topic suffix and payload.
    ///
    /// Returns `None` for unknown suffixes, empty profile names, and
    /// brightness payloads that are neither an integer nor a JSON object.
    #[must_use]
    pub fn parse(suffix: &str, payload: &str) -> Option<Self> {
        match suffix {
            "start_brew" => Some(Self::StartBrew),
            "stop_brew" => Some(Self::StopBrew),
            "continue_brew" => Some(Self::ContinueBrew),
            "preheat" => Some(Self::Preheat),
            "tare_scale" => Some(Self::TareScale),
            "reboot_machine" => Some(Self::RebootMachine),
            "load_profile" | "select_profile" => {
                let name = payload.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(Self::LoadProfile {
                        name: name.to_string(),
                    })
                }
            }
            "set_brightness" => parse_brightness(payload).map(Self::SetBrightness),
            "enable_sounds" => Some(Self::EnableSounds {
                enabled: is_truthy(payload),
            }),
            _ => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_brightness(payload: &str) -> Option<BrightnessCommand> {
    let trimmed = payload.trim();
    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed).ok()?;
        let brightness = f64_field(&value, "brightness").unwrap_or(50.0);
        Some(BrightnessCommand {
            brightness: clamp_percent(brightness),
            interpolation: str_field(&value, "interpolation").map(str::to_string),
            animation_time_ms: f64_field(&value, "animation_time")
                .filter(|ms| *ms >= 0.0)
                .map(|ms| ms as u64),
        })
    } else {
        let brightness: i64 = trimmed.parse().ok()?;
        Some(BrightnessCommand {
            brightness: u8::try_from(brightness.clamp(0, 100)).unwrap_or(100),
            interpolation: None,
            animation_time_ms: None,
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn is_truthy(payload: &str) -> bool {
    matches!(
        payload.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_plain_action_commands() {
        assert_eq!(Command::parse("start_brew", "1"), Some(Command::StartBrew));
        assert_eq!(Command::parse("stop_brew", ""), Some(Command::StopBrew));
        assert_eq!(
            Command::parse("continue_brew", "1"),
            Some(Command::ContinueBrew)
        );
        assert_eq!(Command::parse("preheat", "1"), Some(Command::Preheat));
        assert_eq!(Command::parse("tare_scale", "1"), Some(Command::TareScale));
        assert_eq!(
            Command::parse("reboot_machine", "1"),
            Some(Command::RebootMachine)
        );
    }

    #[test]
    fn should_parse_profile_selection_with_both_suffixes() {
        let expected = Some(Command::LoadProfile {
            name: "Espresso".to_string(),
        });
        assert_eq!(Command::parse("load_profile", "Espresso"), expected);
        assert_eq!(Command::parse("select_profile", "Espresso"), expected);
    }

    #[test]
    fn should_reject_empty_profile_name() {
        assert_eq!(Command::parse("load_profile", "   "), None);
    }

    #[test]
    fn should_parse_integer_brightness() {
        assert_eq!(
            Command::parse("set_brightness", "75"),
            Some(Command::SetBrightness(BrightnessCommand {
                brightness: 75,
                interpolation: None,
                animation_time_ms: None,
            }))
        );
    }

    #[test]
    fn should_parse_json_brightness_with_passthrough_fields() {
        let payload = r#"{"brightness":50,"interpolation":"linear","animation_time":1000}"#;
        assert_eq!(
            Command::parse("set_brightness", payload),
            Some(Command::SetBrightness(BrightnessCommand {
                brightness: 50,
                interpolation: Some("linear".to_string()),
                animation_time_ms: Some(1000),
            }))
        );
    }

    #[test]
    fn should_default_brightness_when_json_omits_it() {
        let parsed = Command::parse("set_brightness", "{}");
        assert_eq!(
            parsed,
            Some(Command::SetBrightness(BrightnessCommand {
                brightness: 50,
                interpolation: None,
                animation_time_ms: None,
            }))
        );
    }

    #[test]
    fn should_clamp_brightness_into_percent_range() {
        match Command::parse("set_brightness", "150") {
            Some(Command::SetBrightness(cmd)) => assert_eq!(cmd.brightness, 100),
            other => panic!("unexpected parse result: {other:?}"),
        }
        match Command::parse("set_brightness", "-5") {
            Some(Command::SetBrightness(cmd)) => assert_eq!(cmd.brightness, 0),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn should_reject_malformed_brightness() {
        assert_eq!(Command::parse("set_brightness", "bright"), None);
        assert_eq!(Command::parse("set_brightness", "{not json"), None);
    }

    #[test]
    fn should_parse_truthy_sound_payloads() {
        for payload in ["true", "1", "on", "yes", "TRUE", "On"] {
            assert_eq!(
                Command::parse("enable_sounds", payload),
                Some(Command::EnableSounds { enabled: true }),
                "payload {payload:?}"
            );
        }
        for payload in ["false", "0", "off", "no", ""] {
            assert_eq!(
                Command::parse("enable_sounds", payload),
                Some(Command::EnableSounds { enabled: false }),
                "payload {payload:?}"
            );
        }
    }

    #[test]
    fn should_ignore_unknown_suffixes() {
        assert_eq!(Command::parse("make_tea", "1"), None);
        assert_eq!(Command::parse("", "1"), None);
    }
}
