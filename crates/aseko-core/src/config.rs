// ── Runtime coordinator configuration ──
//
// Describes *how* to reach the Aseko API and how often to poll.
// Never touches disk: the CLI resolves a config file and hands this in.

use std::time::Duration;

use aseko_api::{API_BASE_URL, AsekoClient, CLIENT_NAME, CLIENT_VERSION, TransportConfig};
use secrecy::SecretString;

use crate::error::CoreError;

/// Default polling cadence.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single-account coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// API base URL (defaults to the production endpoint).
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: SecretString,
    /// Request timeout.
    pub timeout: Duration,
    /// Interval between periodic refreshes. Zero disables the periodic task.
    pub scan_interval: Duration,
    pub client_name: String,
    pub client_version: String,
}

impl CoordinatorConfig {
    /// Production defaults for the given key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            base_url: API_BASE_URL.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            client_name: CLIENT_NAME.into(),
            client_version: CLIENT_VERSION.into(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            client_name: self.client_name.clone(),
            client_version: self.client_version.clone(),
        }
    }

    /// Build the API client described by this config.
    pub fn build_client(&self) -> Result<AsekoClient, CoreError> {
        AsekoClient::from_api_key(&self.base_url, &self.api_key, &self.transport()).map_err(|e| {
            CoreError::Config {
                message: e.to_string(),
            }
        })
    }
}
