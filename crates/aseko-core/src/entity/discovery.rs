// ── Entity discovery ──
//
// Turns the unit map into host-facing entities. Each unit is expanded
// once, the first time it shows up; later refreshes only add entities
// for serials not seen before.

use std::collections::HashSet;

use serde::Serialize;

use aseko_api::UnitSnapshot;

use super::binary_sensor::{
    BINARY_SENSOR_DESCRIPTIONS, BinarySensorDescription, WarningAttributes, warning_attributes,
};
use super::sensor::{SENSOR_DESCRIPTIONS, SensorDescription, SensorValue};
use crate::store::UnitMap;

pub const MANUFACTURER: &str = "Aseko";

/// Device registry record shared by all entities of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: Option<String>,
}

impl DeviceInfo {
    pub fn for_unit(unit: &UnitSnapshot) -> Self {
        let name = unit
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Aseko {}", unit.serial_number));

        Self {
            identifier: unit.serial_number.clone(),
            name,
            manufacturer: MANUFACTURER,
            model: unit.brand_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EntityKind {
    Sensor(&'static SensorDescription),
    BinarySensor(&'static BinarySensorDescription),
}

/// Current state of an entity as read from the latest unit map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityState {
    Sensor(Option<SensorValue>),
    BinarySensor(Option<bool>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReading {
    pub available: bool,
    pub state: EntityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<WarningAttributes>,
}

/// A host-facing entity bound to one unit.
///
/// Holds only the serial number: state is always read from the current
/// map, so an entity never outlives its data.
#[derive(Debug, Clone)]
pub struct Entity {
    pub unique_id: String,
    pub serial_number: String,
    pub device: DeviceInfo,
    pub kind: EntityKind,
}

impl Entity {
    fn new(unit: &UnitSnapshot, kind: EntityKind) -> Self {
        Self {
            unique_id: format!("{}_{}", unit.serial_number, kind.key()),
            serial_number: unit.serial_number.clone(),
            device: DeviceInfo::for_unit(unit),
            kind,
        }
    }

    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Read the entity's state from `units`.
    ///
    /// Unavailable when the last refresh failed or the unit is no longer
    /// in the map. Status-driven binary sensors are also unavailable once
    /// their key disappears from the unit.
    pub fn read(&self, units: &UnitMap, last_update_success: bool) -> EntityReading {
        let Some(unit) = units.get(&self.serial_number) else {
            return self.unavailable();
        };

        match self.kind {
            EntityKind::Sensor(d) => EntityReading {
                available: last_update_success,
                state: EntityState::Sensor(d.value(unit)),
                attributes: None,
            },
            EntityKind::BinarySensor(d) => EntityReading {
                available: last_update_success && d.applies_to(unit),
                state: EntityState::BinarySensor(d.value(unit)),
                attributes: if d.key == "has_warning" {
                    warning_attributes(unit)
                } else {
                    None
                },
            },
        }
    }

    fn unavailable(&self) -> EntityReading {
        let state = match self.kind {
            EntityKind::Sensor(_) => EntityState::Sensor(None),
            EntityKind::BinarySensor(_) => EntityState::BinarySensor(None),
        };
        EntityReading {
            available: false,
            state,
            attributes: None,
        }
    }
}

impl EntityKind {
    pub fn key(self) -> &'static str {
        match self {
            Self::Sensor(d) => d.key,
            Self::BinarySensor(d) => d.key,
        }
    }
}

/// All entities that apply to `unit`: sensors first, then binary sensors.
pub fn entities_for_unit(unit: &UnitSnapshot) -> Vec<Entity> {
    let sensors = SENSOR_DESCRIPTIONS
        .iter()
        .filter(|d| d.applies_to(unit))
        .map(EntityKind::Sensor);
    let binary = BINARY_SENSOR_DESCRIPTIONS
        .iter()
        .filter(|d| d.applies_to(unit))
        .map(EntityKind::BinarySensor);

    sensors.chain(binary).map(|kind| Entity::new(unit, kind)).collect()
}

/// Tracks which units already have entities.
///
/// Units that drop out of the map keep their serial here; their entities
/// become unavailable instead of being re-created when they return.
#[derive(Debug, Default)]
pub struct EntityDiscovery {
    known: HashSet<String>,
}

impl EntityDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities for units not seen by an earlier call.
    pub fn discover(&mut self, units: &UnitMap) -> Vec<Entity> {
        let mut new_entities = Vec::new();
        for (serial, unit) in units {
            if self.known.insert(serial.clone()) {
                new_entities.extend(entities_for_unit(unit));
            }
        }
        new_entities
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;

    fn unit(value: Value) -> UnitSnapshot {
        let resp: aseko_api::types::UnitDetailResponse = serde_json::from_value(value).unwrap();
        UnitSnapshot::try_from(resp).unwrap()
    }

    fn map(units: Vec<UnitSnapshot>) -> UnitMap {
        units
            .into_iter()
            .map(|u| (u.serial_number.clone(), Arc::new(u)))
            .collect()
    }

    fn pool() -> UnitSnapshot {
        unit(json!({
            "serialNumber": "110123456",
            "name": "Backyard",
            "online": true,
            "brandName": { "primary": "ASIN AQUA", "secondary": "Salt" },
            "statusValues": { "waterTemperature": "27.5", "redox": "712", "filtrationRunning": true }
        }))
    }

    #[test]
    fn device_info_falls_back_to_serial() {
        let named = DeviceInfo::for_unit(&pool());
        assert_eq!(named.name, "Backyard");
        assert_eq!(named.manufacturer, "Aseko");
        assert_eq!(named.model.as_deref(), Some("ASIN AQUA Salt"));

        let anonymous = DeviceInfo::for_unit(&unit(json!({ "serialNumber": "999" })));
        assert_eq!(anonymous.name, "Aseko 999");
        assert_eq!(anonymous.model, None);
    }

    #[test]
    fn entities_follow_reported_keys() {
        let ids: Vec<String> = entities_for_unit(&pool())
            .into_iter()
            .map(|e| e.unique_id)
            .collect();
        assert_eq!(
            ids,
            [
                "110123456_water_temperature",
                "110123456_redox",
                "110123456_online",
                "110123456_has_warning",
                "110123456_filtration_running",
            ]
        );
    }

    #[test]
    fn discover_only_returns_new_units() {
        let mut discovery = EntityDiscovery::new();

        let first = discovery.discover(&map(vec![pool()]));
        assert_eq!(first.len(), 5);

        let again = discovery.discover(&map(vec![pool()]));
        assert!(again.is_empty());

        let second = unit(json!({ "serialNumber": "220000001" }));
        let added = discovery.discover(&map(vec![pool(), second]));
        assert!(added.iter().all(|e| e.serial_number == "220000001"));
        assert_eq!(added.len(), 2);
    }

    #[test]
    fn removed_unit_is_not_rediscovered() {
        let mut discovery = EntityDiscovery::new();
        discovery.discover(&map(vec![pool()]));
        discovery.discover(&UnitMap::new());

        assert!(discovery.discover(&map(vec![pool()])).is_empty());
    }

    #[test]
    fn read_reflects_map_and_refresh_outcome() {
        let units = map(vec![pool()]);
        let entities = entities_for_unit(&pool());
        let temp = entities.iter().find(|e| e.key() == "water_temperature").unwrap();

        let ok = temp.read(&units, true);
        assert!(ok.available);
        assert_eq!(ok.state, EntityState::Sensor(Some(SensorValue::Float(27.5))));

        assert!(!temp.read(&units, false).available);

        let gone = temp.read(&UnitMap::new(), true);
        assert!(!gone.available);
        assert_eq!(gone.state, EntityState::Sensor(None));
    }

    #[test]
    fn status_binary_sensor_unavailable_when_key_disappears() {
        let entities = entities_for_unit(&pool());
        let filtration = entities
            .iter()
            .find(|e| e.key() == "filtration_running")
            .unwrap();

        let without_key = map(vec![unit(json!({ "serialNumber": "110123456", "online": true }))]);
        let reading = filtration.read(&without_key, true);
        assert!(!reading.available);
        assert_eq!(reading.state, EntityState::BinarySensor(None));
    }

    #[test]
    fn warning_sensor_carries_attributes() {
        let warn = unit(json!({
            "serialNumber": "110123456",
            "statusMessages": [{ "type": "LOW_PH", "severity": "WARNING" }]
        }));
        let entities = entities_for_unit(&warn);
        let has_warning = entities.iter().find(|e| e.key() == "has_warning").unwrap();

        let reading = has_warning.read(&map(vec![warn.clone()]), true);
        assert_eq!(reading.state, EntityState::BinarySensor(Some(true)));
        assert_eq!(reading.attributes.unwrap().error_types, "LOW_PH");
    }
}
