//! Watch subcommand: run the coordinator's polling loop and report each
//! refresh until interrupted.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;

use aseko_core::{
    Coordinator, CoordinatorConfig, EntityDiscovery, RefreshState, RefreshStatus, UnitUpdate,
};

use super::sensors::EntityView;
use crate::cli::{OutputFormat, WatchArgs};
use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

/// One line of machine-readable watch output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent<'a> {
    Refreshed {
        units: usize,
        added: &'a [String],
        removed: &'a [String],
        new_entities: &'a [EntityView],
    },
    Failed {
        auth_failed: bool,
        error: Option<&'a str>,
    },
}

pub async fn handle(
    args: WatchArgs,
    mut coordinator_config: CoordinatorConfig,
    view: Presentation,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        coordinator_config.scan_interval = Duration::from_secs(secs);
    }
    if coordinator_config.scan_interval.is_zero() {
        return Err(CliError::Validation {
            field: "scan_interval".into(),
            reason: "watch needs a non-zero interval; pass --interval".into(),
        });
    }

    let coordinator = Coordinator::new(coordinator_config)?;
    let mut stream = coordinator.subscribe();
    let mut status = coordinator.status();
    let mut discovery = EntityDiscovery::new();

    // Subscribed before the first refresh, so it is reported as a change
    // from the empty map. A transient first failure is reported by the
    // status branch below and polling carries on; a rejected key ends here.
    match coordinator.start().await {
        Ok(()) => {}
        Err(e) if e.is_auth_failure() => return Err(e.into()),
        Err(e) => {
            tracing::debug!(error = %e, "first refresh failed, polling anyway");
            coordinator.spawn_refresh_task().await;
        }
    }

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            update = stream.changed() => {
                let Some(update) = update else { break Ok(()) };
                if let Err(e) = report_refresh(&coordinator, &mut discovery, &update, view) {
                    break Err(e);
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = status.borrow_and_update().clone();
                if let Err(e) = report_failure(&snapshot, view) {
                    break Err(e);
                }
            }
        }
    };

    coordinator.shutdown().await;
    result
}

fn report_refresh(
    coordinator: &Coordinator,
    discovery: &mut EntityDiscovery,
    update: &UnitUpdate,
    view: Presentation,
) -> Result<(), CliError> {
    let ok = coordinator.last_update_success();
    let new_entities: Vec<EntityView> = discovery
        .discover(&update.units)
        .iter()
        .map(|e| EntityView::new(e, &update.units, ok))
        .collect();

    let line = match view.output {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => render_event(
            view.output,
            &WatchEvent::Refreshed {
                units: update.units.len(),
                added: &update.added,
                removed: &update.removed,
                new_entities: &new_entities,
            },
        )?,
        OutputFormat::Plain => update.units.keys().cloned().collect::<Vec<_>>().join(" "),
        OutputFormat::Table => {
            let mut line = format!(
                "{} refreshed {} unit(s)",
                output::dim(&timestamp(), view.color),
                update.units.len()
            );
            if !update.added.is_empty() {
                let _ = write!(line, ", added: {}", update.added.join(", "));
            }
            if !update.removed.is_empty() {
                let _ = write!(line, ", removed: {}", update.removed.join(", "));
            }
            for entity in &new_entities {
                let _ = write!(
                    line,
                    "\n  + {} {} = {}",
                    entity.device_name,
                    entity.key,
                    entity.state_text()
                );
            }
            line
        }
    };

    output::print_output(&line, view.quiet);
    Ok(())
}

/// Report status transitions that end a refresh unsuccessfully.
fn report_failure(status: &RefreshStatus, view: Presentation) -> Result<(), CliError> {
    if status.last_update_success || status.state != RefreshState::Idle {
        return Ok(());
    }

    let line = match view.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let reason = status.last_error.as_deref().unwrap_or("unknown error");
            let mut line = format!(
                "{} {} {reason}",
                output::dim(&timestamp(), view.color),
                output::status_word("refresh failed:", false, view.color),
            );
            if status.auth_failed {
                line.push_str("\n  API key rejected; run `aseko config set-key` to replace it");
            }
            line
        }
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => render_event(
            view.output,
            &WatchEvent::Failed {
                auth_failed: status.auth_failed,
                error: status.last_error.as_deref(),
            },
        )?,
    };

    // Failures go to stderr so a piped stdout only carries refreshes.
    if !view.quiet {
        eprintln!("{line}");
    }
    Ok(())
}

/// One event per line for JSON, one `---` document per event for YAML.
fn render_event(format: OutputFormat, event: &WatchEvent<'_>) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(event)?.trim_end())),
        _ => output::render_json(event, true),
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
