//! Configuration for the Aseko bridge.
//!
//! TOML config file, credential resolution (env + keyring + plaintext),
//! and translation to `aseko_core::CoordinatorConfig`. The CLI layers its
//! flag overrides on top of this.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aseko_core::{API_BASE_URL, CoordinatorConfig, DEFAULT_SCAN_INTERVAL, DEFAULT_TIMEOUT};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "aseko";
/// Keyring entry holding the API key.
pub const KEYRING_USER: &str = "api-key";
/// Environment variable consulted before any configured source.
pub const API_KEY_ENV: &str = "ASEKO_API_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured")]
    NoCredentials,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// The configured account.
    #[serde(default)]
    pub account: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Connection and credential settings of the single account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    /// API key (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between refreshes.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Account identity recorded at setup; a new key must match it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            base_url: default_base_url(),
            scan_interval: default_scan_interval(),
            unique_id: None,
        }
    }
}

fn default_base_url() -> String {
    API_BASE_URL.into()
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "aseko", "aseko").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("aseko");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment.
///
/// Layering: built-in defaults, then the TOML file (if present), then
/// `ASEKO_<SECTION>__<FIELD>` variables, e.g. `ASEKO_ACCOUNT__SCAN_INTERVAL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ASEKO_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject values the coordinator cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.account.base_url).map_err(|e| ConfigError::Validation {
            field: "account.base_url".into(),
            reason: format!("{e}: {}", self.account.base_url),
        })?;

        if self.defaults.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key from the credential chain.
///
/// Order: `ASEKO_API_KEY`, the variable named by `api_key_env`, the
/// system keyring, then the plaintext `api_key`.
pub fn resolve_api_key(account: &Account) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(account, |name| std::env::var(name).ok(), read_keyring)
}

fn resolve_api_key_with(
    account: &Account,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |v: &String| !v.trim().is_empty();

    // 1. Global env var
    if let Some(val) = env(API_KEY_ENV).filter(non_empty) {
        return Ok(SecretString::from(val));
    }

    // 2. Account's api_key_env -> env var lookup
    if let Some(val) = account.api_key_env.as_deref().and_then(&env).filter(non_empty) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(secret) = keyring().filter(non_empty) {
        return Ok(SecretString::from(secret));
    }

    // 4. Plaintext in config
    if let Some(key) = account.api_key.clone().filter(non_empty) {
        return Ok(SecretString::from(key));
    }

    Err(ConfigError::NoCredentials)
}

fn read_keyring() -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store the API key in the system keyring.
pub fn store_api_key(key: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(key.expose_secret())?;
    Ok(())
}

// ── Translation to coordinator config ───────────────────────────────

/// Build a `CoordinatorConfig` from the file config and a resolved key.
pub fn to_coordinator_config(cfg: &Config, api_key: SecretString) -> CoordinatorConfig {
    CoordinatorConfig {
        base_url: cfg.account.base_url.clone(),
        timeout: Duration::from_secs(cfg.defaults.timeout),
        scan_interval: Duration::from_secs(cfg.account.scan_interval),
        ..CoordinatorConfig::new(api_key)
    }
}
