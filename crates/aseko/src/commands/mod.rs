//! Command dispatch: bridges CLI args -> API / coordinator -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod sensors;
pub mod units;
pub mod watch;

use aseko_core::CoordinatorConfig;

use crate::cli::Command;
use crate::config::{Config, Presentation};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator_config: CoordinatorConfig,
    cfg: &Config,
    view: Presentation,
) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(args, &coordinator_config, cfg, view).await,
        Command::Units(args) => units::handle(args, &coordinator_config, view).await,
        Command::Sensors(args) => sensors::handle(args, coordinator_config, view).await,
        Command::Watch(args) => watch::handle(args, coordinator_config, view).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before dispatch".into(),
        }),
    }
}
