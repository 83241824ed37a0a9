//! Units subcommand handlers.

use std::fmt::Write as _;

use serde_json::Value;
use tabled::Tabled;

use aseko_api::{AsekoClient, UnitSnapshot};
use aseko_core::CoordinatorConfig;

use crate::cli::{UnitsArgs, UnitsCommand};
use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Warning")]
    warning: String,
}

impl UnitRow {
    fn new(u: &UnitSnapshot, color: bool) -> Self {
        Self {
            serial: u.serial_number.clone(),
            name: u.name.clone().unwrap_or_default(),
            model: u.brand_name.clone().unwrap_or_default(),
            online: output::status_word(if u.online { "yes" } else { "no" }, u.online, color),
            warning: output::status_word(
                if u.has_warning { "yes" } else { "no" },
                !u.has_warning,
                color,
            ),
        }
    }
}

#[derive(Tabled)]
struct SerialRow {
    #[tabled(rename = "Serial")]
    serial: String,
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(u: &UnitSnapshot, color: bool) -> String {
    let pairs = [
        ("Serial", u.serial_number.clone()),
        ("Name", u.name.clone().unwrap_or_else(|| "-".into())),
        ("Model", u.brand_name.clone().unwrap_or_else(|| "-".into())),
        ("Note", u.note.clone().unwrap_or_else(|| "-".into())),
        (
            "Online",
            output::status_word(if u.online { "yes" } else { "no" }, u.online, color),
        ),
        (
            "Warning",
            output::status_word(
                if u.has_warning { "yes" } else { "no" },
                !u.has_warning,
                color,
            ),
        ),
    ];

    let mut lines = output::detail_lines(&pairs);

    if !u.status_values.is_empty() {
        lines.push_str("\n\nStatus values:");
        for (key, value) in &u.status_values {
            let _ = write!(lines, "\n  {key}: {}", display_value(value));
        }
    }

    let problems: Vec<_> = u.problem_messages().collect();
    if !problems.is_empty() {
        lines.push_str("\n\nMessages:");
        for m in problems {
            let kind = m.kind.as_deref().unwrap_or("?");
            let text = m.message.as_deref().unwrap_or_default();
            let _ = write!(lines, "\n  {kind}: {}", output::dim(text, color));
        }
    }
    lines
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: UnitsArgs,
    coordinator_config: &CoordinatorConfig,
    view: Presentation,
) -> Result<(), CliError> {
    let client: AsekoClient = coordinator_config.build_client()?;

    let out = match args.command {
        UnitsCommand::List => {
            let units = client.get_units().await?;
            output::render_list(
                view.output,
                &units,
                |u| UnitRow::new(u, view.color),
                |u| u.serial_number.clone(),
            )?
        }

        UnitsCommand::Serials => {
            let serials = client.get_unit_serials().await?;
            output::render_list(
                view.output,
                &serials,
                |s| SerialRow { serial: s.clone() },
                Clone::clone,
            )?
        }

        UnitsCommand::Get { serial } => {
            let unit = client.get_unit(&serial).await.map_err(|e| {
                if e.is_not_found() {
                    CliError::NotFound {
                        resource_type: "unit".into(),
                        identifier: serial.clone(),
                        list_command: "units serials".into(),
                    }
                } else {
                    e.into()
                }
            })?;
            output::render_single(
                view.output,
                &unit,
                |u| detail(u, view.color),
                |u| u.serial_number.clone(),
            )?
        }
    };

    output::print_output(&out, view.quiet);
    Ok(())
}
