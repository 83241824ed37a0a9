// ── Core error types ──
//
// Coordinator-level errors. Consumers never see HTTP status codes
// directly: the `From<aseko_api::Error>` impl folds the four API error
// kinds into the two refresh outcomes the host cares about.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Refresh outcomes ─────────────────────────────────────────────
    /// The API key was rejected. Fatal until credentials are replaced.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Any other failed refresh. Retried on the next cycle.
    #[error("Error fetching data: {message}")]
    UpdateFailed { message: String },

    // ── Setup / re-authentication ────────────────────────────────────
    #[error("Invalid API key")]
    InvalidAuth,

    #[error("Cannot connect to the Aseko API: {message}")]
    CannotConnect { message: String },

    #[error("API key belongs to a different account (expected {expected}, got {actual})")]
    AccountMismatch { expected: String, actual: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Coordinator has been shut down")]
    ShutDown,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the host should prompt for a new API key.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::InvalidAuth)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<aseko_api::Error> for CoreError {
    fn from(err: aseko_api::Error) -> Self {
        if err.is_auth_error() {
            CoreError::AuthenticationFailed {
                message: err.to_string(),
            }
        } else {
            CoreError::UpdateFailed {
                message: err.to_string(),
            }
        }
    }
}
