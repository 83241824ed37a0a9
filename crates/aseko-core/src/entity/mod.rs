// Host-facing entity tables: numeric sensors, binary sensors and the
// discovery that binds them to units.

pub mod binary_sensor;
pub mod discovery;
pub mod sensor;

pub use binary_sensor::{
    BINARY_SENSOR_DESCRIPTIONS, BinarySensorDescription, BinarySensorDeviceClass, BinarySource,
    WarningAttributes, WarningEntry, parse_bool_status, warning_attributes,
};
pub use discovery::{
    DeviceInfo, Entity, EntityDiscovery, EntityKind, EntityReading, EntityState, MANUFACTURER,
    entities_for_unit,
};
pub use sensor::{
    SENSOR_DESCRIPTIONS, SensorDescription, SensorDeviceClass, SensorValue, ValueKind,
    parse_float, parse_int,
};
