// Numeric sensor descriptions and value parsers.

use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoStaticStr};

use aseko_api::UnitSnapshot;

/// Home-automation device class of a numeric sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    Temperature,
    Ph,
    Voltage,
}

/// How a raw status value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    /// Parsed as a float, then truncated toward zero.
    Int,
}

/// Static description of one numeric sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    /// Entity key, suffix of the unique id.
    pub key: &'static str,
    /// Key in [`UnitSnapshot::status_values`].
    pub status_key: &'static str,
    pub device_class: Option<SensorDeviceClass>,
    pub unit_of_measurement: Option<&'static str>,
    pub kind: ValueKind,
}

/// A parsed sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Float(f64),
    Int(i64),
}

impl std::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

pub const SENSOR_DESCRIPTIONS: &[SensorDescription] = &[
    SensorDescription {
        key: "water_temperature",
        status_key: "waterTemperature",
        device_class: Some(SensorDeviceClass::Temperature),
        unit_of_measurement: Some("°C"),
        kind: ValueKind::Float,
    },
    SensorDescription {
        key: "air_temperature",
        status_key: "airTemperature",
        device_class: Some(SensorDeviceClass::Temperature),
        unit_of_measurement: Some("°C"),
        kind: ValueKind::Float,
    },
    SensorDescription {
        key: "ph",
        status_key: "ph",
        device_class: Some(SensorDeviceClass::Ph),
        unit_of_measurement: None,
        kind: ValueKind::Float,
    },
    SensorDescription {
        key: "redox",
        status_key: "redox",
        device_class: Some(SensorDeviceClass::Voltage),
        unit_of_measurement: Some("mV"),
        kind: ValueKind::Int,
    },
    SensorDescription {
        key: "cl_free",
        status_key: "clFree",
        device_class: None,
        unit_of_measurement: Some("ppm"),
        kind: ValueKind::Float,
    },
    SensorDescription {
        key: "salinity",
        status_key: "salinity",
        device_class: None,
        unit_of_measurement: Some("g/L"),
        kind: ValueKind::Float,
    },
    SensorDescription {
        key: "electrolyzer",
        status_key: "electrolyzer",
        device_class: None,
        unit_of_measurement: Some("%"),
        kind: ValueKind::Int,
    },
    SensorDescription {
        key: "dose",
        status_key: "dose",
        device_class: None,
        unit_of_measurement: Some("%"),
        kind: ValueKind::Int,
    },
];

impl SensorDescription {
    /// A unit gets this sensor iff it reports the status key.
    pub fn applies_to(&self, unit: &UnitSnapshot) -> bool {
        unit.status_values.contains_key(self.status_key)
    }

    /// Parsed reading for `unit`; `None` when absent or unparseable.
    pub fn value(&self, unit: &UnitSnapshot) -> Option<SensorValue> {
        let raw = unit.status_value(self.status_key)?;
        match self.kind {
            ValueKind::Float => parse_float(raw).map(SensorValue::Float),
            ValueKind::Int => parse_int(raw).map(SensorValue::Int),
        }
    }
}

// ── Parsers ──────────────────────────────────────────────────────

/// Numbers pass through; strings are parsed. `"---"` and `""` mean no reading.
pub fn parse_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "---" {
                return None;
            }
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// As [`parse_float`], truncated toward zero. `"7.9"` reads as `7`.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn parse_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        _ => parse_float(raw).map(|v| v.trunc() as i64),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn unit_with(values: Value) -> UnitSnapshot {
        let Value::Object(status_values) = values else {
            panic!("status values must be an object");
        };
        UnitSnapshot {
            serial_number: "110123456".into(),
            name: None,
            note: None,
            online: true,
            has_warning: false,
            brand_name: None,
            status_values,
            status_messages: Vec::new(),
        }
    }

    fn description(key: &str) -> &'static SensorDescription {
        SENSOR_DESCRIPTIONS.iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn placeholder_and_empty_are_no_reading() {
        assert_eq!(parse_float(&json!("---")), None);
        assert_eq!(parse_float(&json!("")), None);
        assert_eq!(parse_int(&json!("---")), None);
        assert_eq!(parse_int(&json!("")), None);
    }

    #[test]
    fn garbage_is_no_reading() {
        assert_eq!(parse_float(&json!("warm")), None);
        assert_eq!(parse_float(&json!(null)), None);
        assert_eq!(parse_float(&json!(true)), None);
        assert_eq!(parse_int(&json!("abc")), None);
    }

    #[test]
    fn strings_and_numbers_parse() {
        assert_eq!(parse_float(&json!("27.5")), Some(27.5));
        assert_eq!(parse_float(&json!(7.2)), Some(7.2));
        assert_eq!(parse_int(&json!(712)), Some(712));
        assert_eq!(parse_int(&json!("712")), Some(712));
    }

    #[test]
    fn int_truncates_through_float() {
        assert_eq!(parse_int(&json!("7.9")), Some(7));
        assert_eq!(parse_int(&json!(-3.7)), Some(-3));
    }

    #[test]
    fn table_has_every_sensor_once() {
        let keys: Vec<&str> = SENSOR_DESCRIPTIONS.iter().map(|d| d.key).collect();
        assert_eq!(
            keys,
            [
                "water_temperature",
                "air_temperature",
                "ph",
                "redox",
                "cl_free",
                "salinity",
                "electrolyzer",
                "dose",
            ]
        );
        assert_eq!(description("redox").kind, ValueKind::Int);
        assert_eq!(description("redox").unit_of_measurement, Some("mV"));
        assert_eq!(
            description("water_temperature").device_class.unwrap().to_string(),
            "temperature"
        );
    }

    #[test]
    fn sensor_applies_only_when_key_present() {
        let unit = unit_with(json!({ "waterTemperature": "---", "ph": "7.21" }));

        let applicable: Vec<&str> = SENSOR_DESCRIPTIONS
            .iter()
            .filter(|d| d.applies_to(&unit))
            .map(|d| d.key)
            .collect();
        assert_eq!(applicable, ["water_temperature", "ph"]);

        // present but unreadable: the entity exists with no value
        assert_eq!(description("water_temperature").value(&unit), None);
        assert_eq!(
            description("ph").value(&unit),
            Some(SensorValue::Float(7.21))
        );
    }

    #[test]
    fn empty_status_values_yield_no_sensors() {
        let unit = unit_with(Value::Object(Map::new()));
        assert!(SENSOR_DESCRIPTIONS.iter().all(|d| !d.applies_to(&unit)));
    }
}
