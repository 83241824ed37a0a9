//! CLI configuration -- thin wrapper around `aseko_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--api-key`, `--base-url`, `--timeout`, `--output`, `--color`).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use aseko_core::CoordinatorConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use aseko_config::{Config, config_path, load_config, save_config, store_api_key};

/// Effective presentation settings after merging flags and config.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Presentation {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Self {
        let output = global
            .output
            .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            output,
            color: crate::output::should_color(color),
            quiet: global.quiet,
        }
    }
}

/// Resolve the API key: flag / `ASEKO_API_KEY` first, then the config chain.
pub fn resolve_api_key(global: &GlobalOpts, cfg: &Config) -> Result<SecretString, CliError> {
    if let Some(key) = global.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        return Ok(SecretString::from(key.clone()));
    }
    Ok(aseko_config::resolve_api_key(&cfg.account)?)
}

/// Build a `CoordinatorConfig` from the config file and flag overrides.
pub fn coordinator_config(global: &GlobalOpts, cfg: &Config) -> Result<CoordinatorConfig, CliError> {
    let api_key = resolve_api_key(global, cfg)?;
    coordinator_config_with_key(global, cfg, api_key)
}

/// Like [`coordinator_config`], with an explicit key (setup prompts).
pub fn coordinator_config_with_key(
    global: &GlobalOpts,
    cfg: &Config,
    api_key: SecretString,
) -> Result<CoordinatorConfig, CliError> {
    let mut config = aseko_config::to_coordinator_config(cfg, api_key);

    if let Some(ref base_url) = global.base_url {
        url_check(base_url)?;
        config.base_url.clone_from(base_url);
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn url_check(raw: &str) -> Result<(), CliError> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "base_url".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        })
    }
}
