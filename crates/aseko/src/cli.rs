//! Clap derive structures for the `aseko` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aseko -- poll Aseko pool controllers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "aseko",
    version,
    about = "Monitor Aseko pool and spa controllers from the command line",
    long_about = "Reads every unit paired with an Aseko cloud account, derives \
        sensor readings, and can keep polling on a fixed interval.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Aseko cloud API key
    #[arg(long, env = "ASEKO_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides config)
    #[arg(long, env = "ASEKO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "ASEKO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ASEKO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the configured API key
    Auth(AuthArgs),

    /// List and inspect paired units
    #[command(alias = "u")]
    Units(UnitsArgs),

    /// Show derived sensor readings
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// Poll continuously and report every refresh
    Watch(WatchArgs),

    /// Manage CLI configuration and credentials
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Check the key and print the account identity
    Check,
}

// ── Units ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UnitsArgs {
    #[command(subcommand)]
    pub command: UnitsCommand,
}

#[derive(Debug, Subcommand)]
pub enum UnitsCommand {
    /// Fetch every unit with its current status
    #[command(alias = "ls")]
    List,

    /// List paired serial numbers only
    Serials,

    /// Fetch one unit by serial number
    Get {
        /// Unit serial number
        serial: String,
    },
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    /// Only show sensors of this unit
    #[arg(long, short = 'u')]
    pub unit: Option<String>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (overrides config)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Config key (base_url, scan_interval, api_key_env, output, color, timeout)
        key: String,
        /// Value to set
        value: String,
    },

    /// Replace the stored API key (must belong to the configured account)
    SetKey,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
