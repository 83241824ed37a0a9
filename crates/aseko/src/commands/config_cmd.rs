//! Config subcommand handlers.

use clap::ValueEnum;
use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};

use aseko_core::{AccountIdentity, ENTRY_TITLE, setup};

use crate::cli::{ColorMode, ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Presentation};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_api_key() -> Result<SecretString, CliError> {
    let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(SecretString::from(key.to_string()))
}

/// Validate `api_key` against the configured endpoint.
///
/// With `expected` set the key must belong to that account.
async fn check_key(
    global: &GlobalOpts,
    cfg: &Config,
    api_key: &SecretString,
    expected: Option<&str>,
) -> Result<AccountIdentity, CliError> {
    let coordinator_config = config::coordinator_config_with_key(global, cfg, api_key.clone())?;
    let client = coordinator_config.build_client()?;
    let identity = match expected {
        Some(expected) => setup::verify_reauth(expected, &client, api_key).await?,
        None => setup::validate_account(&client, api_key).await?,
    };
    Ok(identity)
}

fn parse_number(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Config with secrets masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.account.api_key.is_some() {
        shown.account.api_key = Some(REDACTED.into());
    }
    shown
}

fn detail(cfg: &Config) -> String {
    let a = &cfg.account;
    output::detail_lines(&[
        ("Base URL", a.base_url.clone()),
        ("Scan interval", format!("{}s", a.scan_interval)),
        ("API key", a.api_key.clone().unwrap_or_else(|| "(keyring / env)".into())),
        ("API key env", a.api_key_env.clone().unwrap_or_else(|| "-".into())),
        ("Account", a.unique_id.clone().unwrap_or_else(|| "-".into())),
        ("Output", cfg.defaults.output.clone()),
        ("Color", cfg.defaults.color.clone()),
        ("Timeout", format!("{}s", cfg.defaults.timeout)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("{ENTRY_TITLE} configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config()?;
            if let Some(ref base_url) = global.base_url {
                cfg.account.base_url.clone_from(base_url);
            }

            // 1. API key, validated before anything is written
            let api_key = prompt_api_key()?;
            let identity = check_key(global, &cfg, &api_key, None).await?;
            eprintln!(
                "   Key valid: account {} with {} unit(s)",
                identity.unique_id,
                identity.serials.len()
            );

            // 2. Storage
            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API key?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            if store_selection == 0 {
                config::store_api_key(&api_key)?;
                cfg.account.api_key = None;
                eprintln!("   API key stored in system keyring");
            } else {
                cfg.account.api_key = Some(api_key.expose_secret().to_owned());
            }

            // 3. Polling interval
            cfg.account.scan_interval = Input::new()
                .with_prompt("Seconds between refreshes")
                .default(cfg.account.scan_interval)
                .interact_text()
                .map_err(prompt_err)?;

            cfg.account.unique_id = Some(identity.unique_id);

            let path = config::save_config(&cfg)?;
            eprintln!("\nConfiguration written to {}", path.display());
            eprintln!("\n  Test it: aseko units list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let view = Presentation::resolve(global, &cfg);
            let out = output::render_single(
                view.output,
                &redacted(&cfg),
                detail,
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, view.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;

            match key.as_str() {
                "base_url" | "base-url" => cfg.account.base_url = value,
                "scan_interval" | "scan-interval" => {
                    cfg.account.scan_interval = parse_number("scan_interval", &value)?;
                }
                "api_key_env" | "api-key-env" => cfg.account.api_key_env = Some(value),
                "timeout" => cfg.defaults.timeout = parse_number("timeout", &value)?,
                "output" => {
                    OutputFormat::from_str(&value, true).map_err(|reason| CliError::Validation {
                        field: "output".into(),
                        reason,
                    })?;
                    cfg.defaults.output = value;
                }
                "color" => {
                    ColorMode::from_str(&value, true).map_err(|reason| CliError::Validation {
                        field: "color".into(),
                        reason,
                    })?;
                    cfg.defaults.color = value;
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: base_url, scan_interval, \
                             api_key_env, output, color, timeout"
                        ),
                    });
                }
            }

            cfg.validate()?;
            config::save_config(&cfg)?;
            eprintln!("Set {key}");
            Ok(())
        }

        // ── SetKey: re-authentication ───────────────────────────────
        ConfigCommand::SetKey => {
            let mut cfg = config::load_config()?;
            let api_key = prompt_api_key()?;

            let identity =
                check_key(global, &cfg, &api_key, cfg.account.unique_id.as_deref()).await?;

            if cfg.account.api_key.is_some() {
                cfg.account.api_key = Some(api_key.expose_secret().to_owned());
                eprintln!("API key updated in config file");
            } else {
                config::store_api_key(&api_key)?;
                eprintln!("API key stored in system keyring");
            }

            if cfg.account.unique_id.is_none() {
                cfg.account.unique_id = Some(identity.unique_id);
            }
            config::save_config(&cfg)?;
            Ok(())
        }
    }
}
