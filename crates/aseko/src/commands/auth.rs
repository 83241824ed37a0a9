//! Auth subcommand handlers.

use serde::Serialize;

use aseko_core::{CoordinatorConfig, setup};

use crate::cli::{AuthArgs, AuthCommand};
use crate::config::{Config, Presentation};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct AuthReport {
    valid: bool,
    unique_id: String,
    units: usize,
    /// Whether the key matches the account recorded in the config.
    matches_config: Option<bool>,
}

pub async fn handle(
    args: AuthArgs,
    coordinator_config: &CoordinatorConfig,
    cfg: &Config,
    view: Presentation,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Check => {
            let client = coordinator_config.build_client()?;
            let api_key = &coordinator_config.api_key;

            let (identity, matches_config) = match cfg.account.unique_id.as_deref() {
                Some(expected) => (
                    setup::verify_reauth(expected, &client, api_key).await?,
                    Some(true),
                ),
                None => (setup::validate_account(&client, api_key).await?, None),
            };

            let report = AuthReport {
                valid: true,
                unique_id: identity.unique_id,
                units: identity.serials.len(),
                matches_config,
            };

            let out = output::render_single(
                view.output,
                &report,
                |r| {
                    output::detail_lines(&[
                        ("Key", output::status_word("valid", r.valid, view.color)),
                        ("Account", r.unique_id.clone()),
                        ("Units", r.units.to_string()),
                    ])
                },
                |r| r.unique_id.clone(),
            )?;
            output::print_output(&out, view.quiet);
            Ok(())
        }
    }
}
