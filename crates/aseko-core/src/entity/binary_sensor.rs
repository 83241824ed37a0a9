// On/off sensor descriptions and the warning attribute builder.

use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoStaticStr};

use aseko_api::{Severity, UnitSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BinarySensorDeviceClass {
    Connectivity,
    Problem,
    Running,
    Heat,
}

/// Where a binary sensor reads its state from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySource {
    Online,
    HasWarning,
    /// A boolean-ish entry in the unit's status values.
    Status(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct BinarySensorDescription {
    pub key: &'static str,
    pub device_class: BinarySensorDeviceClass,
    pub source: BinarySource,
}

pub const BINARY_SENSOR_DESCRIPTIONS: &[BinarySensorDescription] = &[
    BinarySensorDescription {
        key: "online",
        device_class: BinarySensorDeviceClass::Connectivity,
        source: BinarySource::Online,
    },
    BinarySensorDescription {
        key: "has_warning",
        device_class: BinarySensorDeviceClass::Problem,
        source: BinarySource::HasWarning,
    },
    BinarySensorDescription {
        key: "water_flow_to_probes",
        device_class: BinarySensorDeviceClass::Running,
        source: BinarySource::Status("waterFlowToProbes"),
    },
    BinarySensorDescription {
        key: "heating",
        device_class: BinarySensorDeviceClass::Heat,
        source: BinarySource::Status("heatingRunning"),
    },
    BinarySensorDescription {
        key: "electrolyzer_running",
        device_class: BinarySensorDeviceClass::Running,
        source: BinarySource::Status("electrolyzerRunning"),
    },
    BinarySensorDescription {
        key: "solar_running",
        device_class: BinarySensorDeviceClass::Running,
        source: BinarySource::Status("solarRunning"),
    },
    BinarySensorDescription {
        key: "filtration_running",
        device_class: BinarySensorDeviceClass::Running,
        source: BinarySource::Status("filtrationRunning"),
    },
    BinarySensorDescription {
        key: "water_filling_running",
        device_class: BinarySensorDeviceClass::Running,
        source: BinarySource::Status("waterFillingRunning"),
    },
];

impl BinarySensorDescription {
    /// `online` and `has_warning` always apply; status-driven sensors
    /// apply iff the unit reports their key.
    pub fn applies_to(&self, unit: &UnitSnapshot) -> bool {
        match self.source {
            BinarySource::Online | BinarySource::HasWarning => true,
            BinarySource::Status(key) => unit.status_values.contains_key(key),
        }
    }

    pub fn value(&self, unit: &UnitSnapshot) -> Option<bool> {
        match self.source {
            BinarySource::Online => Some(unit.online),
            BinarySource::HasWarning => Some(unit.has_warning),
            BinarySource::Status(key) => unit.status_value(key).and_then(parse_bool_status),
        }
    }
}

/// Interpret a status value as on/off.
///
/// Booleans pass through. Strings are on iff they upper-case to one of
/// `YES`, `ON`, `TRUE`, `1`; `"---"` means no reading. Numbers are on when
/// non-zero. `null` is no reading; arrays and objects are on when non-empty.
pub fn parse_bool_status(raw: &Value) -> Option<bool> {
    match raw {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "---" => None,
        Value::String(s) => Some(matches!(
            s.to_uppercase().as_str(),
            "YES" | "ON" | "TRUE" | "1"
        )),
        Value::Number(n) => Some(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::Array(a) => Some(!a.is_empty()),
        Value::Object(o) => Some(!o.is_empty()),
    }
}

// ── Warning attributes ───────────────────────────────────────────

/// One problem message as exposed on the warning sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub severity: Option<Severity>,
    pub message: Option<String>,
    pub detail: Option<String>,
}

/// Extra attributes attached to the `has_warning` sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningAttributes {
    /// Comma-joined message types, in API order.
    pub error_types: String,
    pub errors: Vec<WarningEntry>,
}

/// Attributes for `unit`'s ERROR and WARNING messages; `None` if it has none.
pub fn warning_attributes(unit: &UnitSnapshot) -> Option<WarningAttributes> {
    let errors: Vec<WarningEntry> = unit
        .problem_messages()
        .map(|m| WarningEntry {
            kind: m.kind.clone(),
            severity: m.severity,
            message: m.message.clone(),
            detail: m.detail.clone(),
        })
        .collect();

    if errors.is_empty() {
        return None;
    }

    let error_types = errors
        .iter()
        .map(|e| e.kind.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    Some(WarningAttributes {
        error_types,
        errors,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn unit(value: Value) -> UnitSnapshot {
        let resp: aseko_api::types::UnitDetailResponse = serde_json::from_value(value).unwrap();
        UnitSnapshot::try_from(resp).unwrap()
    }

    fn description(key: &str) -> &'static BinarySensorDescription {
        BINARY_SENSOR_DESCRIPTIONS.iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn bool_parsing_rules() {
        assert_eq!(parse_bool_status(&json!(true)), Some(true));
        assert_eq!(parse_bool_status(&json!(false)), Some(false));
        assert_eq!(parse_bool_status(&json!("yes")), Some(true));
        assert_eq!(parse_bool_status(&json!("On")), Some(true));
        assert_eq!(parse_bool_status(&json!("TRUE")), Some(true));
        assert_eq!(parse_bool_status(&json!("1")), Some(true));
        assert_eq!(parse_bool_status(&json!("NO")), Some(false));
        assert_eq!(parse_bool_status(&json!("off")), Some(false));
        assert_eq!(parse_bool_status(&json!("")), Some(false));
        assert_eq!(parse_bool_status(&json!("---")), None);
        assert_eq!(parse_bool_status(&json!(null)), None);
        assert_eq!(parse_bool_status(&json!(1)), Some(true));
        assert_eq!(parse_bool_status(&json!(0)), Some(false));
        assert_eq!(parse_bool_status(&json!(0.5)), Some(true));
    }

    #[test]
    fn online_and_warning_always_apply() {
        let bare = unit(json!({ "serialNumber": "A" }));
        let applicable: Vec<&str> = BINARY_SENSOR_DESCRIPTIONS
            .iter()
            .filter(|d| d.applies_to(&bare))
            .map(|d| d.key)
            .collect();
        assert_eq!(applicable, ["online", "has_warning"]);
        assert_eq!(description("online").value(&bare), Some(false));
        assert_eq!(description("has_warning").value(&bare), Some(false));
    }

    #[test]
    fn status_sensors_follow_their_keys() {
        let u = unit(json!({
            "serialNumber": "A",
            "online": true,
            "statusValues": {
                "heatingRunning": "ON",
                "filtrationRunning": true,
                "solarRunning": "---"
            }
        }));

        assert!(description("heating").applies_to(&u));
        assert_eq!(description("heating").value(&u), Some(true));
        assert_eq!(description("filtration_running").value(&u), Some(true));
        assert!(description("solar_running").applies_to(&u));
        assert_eq!(description("solar_running").value(&u), None);
        assert!(!description("water_filling_running").applies_to(&u));
        assert_eq!(description("online").value(&u), Some(true));
    }

    #[test]
    fn warning_attributes_list_problem_messages() {
        let u = unit(json!({
            "serialNumber": "A",
            "statusMessages": [
                { "type": "LOW_PH", "severity": "WARNING", "message": "pH low" },
                { "type": "INFO_MSG", "severity": "INFO" },
                { "type": "NO_FLOW", "severity": "ERROR", "detail": "check pump" }
            ]
        }));

        let attrs = warning_attributes(&u).unwrap();
        assert_eq!(attrs.error_types, "LOW_PH,NO_FLOW");
        assert_eq!(
            attrs.errors,
            vec![
                WarningEntry {
                    kind: Some("LOW_PH".into()),
                    severity: Some(Severity::Warning),
                    message: Some("pH low".into()),
                    detail: None,
                },
                WarningEntry {
                    kind: Some("NO_FLOW".into()),
                    severity: Some(Severity::Error),
                    message: None,
                    detail: Some("check pump".into()),
                },
            ]
        );
    }

    #[test]
    fn no_problem_messages_means_no_attributes() {
        let u = unit(json!({
            "serialNumber": "A",
            "statusMessages": [{ "type": "INFO_MSG", "severity": "INFO" }]
        }));
        assert_eq!(warning_attributes(&u), None);
    }
}
