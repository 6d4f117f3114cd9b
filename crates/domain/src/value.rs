//! Sensor value model.
//!
//! Every state publication is a flat list of `(key, SensorValue)` pairs.
//! Scalars publish through [`Display`](std::fmt::Display); anything
//! structured serializes to a compact JSON string.

use serde_json::Value;

/// A single published sensor value.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Structured data, published as a JSON string.
    Json(Value),
}

impl SensorValue {
    /// Convert a raw JSON value into the closest sensor value.
    ///
    /// Scalars map to their scalar variants; arrays and objects stay
    /// structured and will publish as JSON strings.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(0.0)), Self::Int),
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl std::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for SensorValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SensorValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SensorValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SensorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SensorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
