//! Sensors subcommand: one refresh cycle, then every discovered entity
//! with its current reading.

use serde::Serialize;
use tabled::Tabled;

use aseko_core::entity::{EntityKind, EntityState, WarningAttributes};
use aseko_core::{Coordinator, CoordinatorConfig, Entity, EntityDiscovery, UnitMap};

use crate::cli::SensorsArgs;
use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

/// Serializable view of one entity and its reading.
#[derive(Debug, Serialize)]
pub struct EntityView {
    pub unique_id: String,
    pub serial_number: String,
    pub device_name: String,
    pub key: &'static str,
    pub platform: &'static str,
    pub device_class: Option<&'static str>,
    pub unit_of_measurement: Option<&'static str>,
    pub available: bool,
    pub state: EntityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<WarningAttributes>,
}

impl EntityView {
    pub fn new(entity: &Entity, units: &UnitMap, last_update_success: bool) -> Self {
        let reading = entity.read(units, last_update_success);
        let (platform, device_class, unit_of_measurement) = match entity.kind {
            EntityKind::Sensor(d) => (
                "sensor",
                d.device_class.map(<&'static str>::from),
                d.unit_of_measurement,
            ),
            EntityKind::BinarySensor(d) => {
                ("binary_sensor", Some(<&'static str>::from(d.device_class)), None)
            }
        };

        Self {
            unique_id: entity.unique_id.clone(),
            serial_number: entity.serial_number.clone(),
            device_name: entity.device.name.clone(),
            key: entity.key(),
            platform,
            device_class,
            unit_of_measurement,
            available: reading.available,
            state: reading.state,
            attributes: reading.attributes,
        }
    }

    /// State rendered for humans, with the unit of measurement appended.
    pub fn state_text(&self) -> String {
        match &self.state {
            EntityState::Sensor(Some(v)) => match self.unit_of_measurement {
                Some(uom) => format!("{v} {uom}"),
                None => v.to_string(),
            },
            EntityState::BinarySensor(Some(true)) => "on".into(),
            EntityState::BinarySensor(Some(false)) => "off".into(),
            EntityState::Sensor(None) | EntityState::BinarySensor(None) => "-".into(),
        }
    }
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Entity")]
    key: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl EntityRow {
    fn new(v: &EntityView, color: bool) -> Self {
        Self {
            unit: v.device_name.clone(),
            key: v.key.to_owned(),
            state: v.state_text(),
            class: v.device_class.unwrap_or("-").to_owned(),
            available: output::status_word(
                if v.available { "yes" } else { "no" },
                v.available,
                color,
            ),
        }
    }
}

pub async fn handle(
    args: SensorsArgs,
    mut coordinator_config: CoordinatorConfig,
    view: Presentation,
) -> Result<(), CliError> {
    // Single refresh, no background polling.
    coordinator_config.scan_interval = std::time::Duration::ZERO;
    let coordinator = Coordinator::new(coordinator_config)?;
    coordinator.refresh().await?;

    let units = coordinator.units();
    if let Some(serial) = args.unit.as_ref().filter(|s| !units.contains_key(*s)) {
        return Err(CliError::NotFound {
            resource_type: "unit".into(),
            identifier: serial.clone(),
            list_command: "units serials".into(),
        });
    }

    let ok = coordinator.last_update_success();
    let views: Vec<EntityView> = EntityDiscovery::new()
        .discover(&units)
        .iter()
        .filter(|e| args.unit.as_ref().is_none_or(|s| *s == e.serial_number))
        .map(|e| EntityView::new(e, &units, ok))
        .collect();

    let out = output::render_list(
        view.output,
        &views,
        |v| EntityRow::new(v, view.color),
        |v| v.unique_id.clone(),
    )?;
    output::print_output(&out, view.quiet);
    Ok(())
}
