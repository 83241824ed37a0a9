//! CLI error types with miette diagnostics.
//!
//! Maps API, coordinator and config errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use aseko_config::ConfigError;
use aseko_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Aseko API")]
    #[diagnostic(
        code(aseko::connection_failed),
        help(
            "Check your network connection and the API base URL.\n\
             Override it with --base-url or `aseko config set base_url <url>`."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(aseko::timeout),
        help("Increase the timeout with --timeout or `aseko config set timeout <secs>`.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(aseko::auth_failed),
        help(
            "The API key was rejected or has expired.\n\
             Store a new one with: aseko config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured")]
    #[diagnostic(
        code(aseko::no_credentials),
        help(
            "Configure one with: aseko config init\n\
             Or set the ASEKO_API_KEY environment variable."
        )
    )]
    NoCredentials,

    #[error("API key belongs to a different account")]
    #[diagnostic(
        code(aseko::account_mismatch),
        help(
            "Configured account: {expected}\n\
             Key's account:      {actual}\n\
             Run `aseko config init` to switch accounts."
        )
    )]
    AccountMismatch { expected: String, actual: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(aseko::not_found),
        help("Run: aseko {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(aseko::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aseko::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(aseko::config),
        help("Inspect the file with: aseko config show")
    )]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(aseko::serialization))]
    Serialization { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials | Self::AccountMismatch { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Upstream error mapping ───────────────────────────────────────────

impl From<aseko_api::Error> for CliError {
    fn from(err: aseko_api::Error) -> Self {
        match err {
            aseko_api::Error::Authentication { message } => CliError::AuthFailed { message },
            aseko_api::Error::NotFound { endpoint } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: endpoint,
                list_command: "units serials".into(),
            },
            aseko_api::Error::Connection {
                source: Some(source),
                ..
            } if source.is_timeout() => CliError::Timeout,
            aseko_api::Error::Connection { message, source } => CliError::ConnectionFailed {
                source: match source {
                    Some(e) => Box::new(e),
                    None => message.into(),
                },
            },
            aseko_api::Error::InvalidUrl(e) => CliError::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            aseko_api::Error::InvalidApiKey(reason) => CliError::Validation {
                field: "api_key".into(),
                reason,
            },
            err @ aseko_api::Error::Deserialization { .. } => CliError::ConnectionFailed {
                source: Box::new(err),
            },
            other => CliError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::InvalidAuth => CliError::AuthFailed {
                message: "the API key is not valid".into(),
            },
            CoreError::CannotConnect { message } => CliError::ConnectionFailed {
                source: message.into(),
            },
            CoreError::AccountMismatch { expected, actual } => {
                CliError::AccountMismatch { expected, actual }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other @ (CoreError::UpdateFailed { .. } | CoreError::ShutDown) => CliError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
