// Shared transport configuration for building the reqwest::Client.
//
// Every request carries the bearer token plus fixed client-identification
// headers, so they are installed once as default headers.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Production API base URL.
pub const API_BASE_URL: &str = "https://api.aseko.cloud/api/v1";

/// Client name sent in `X-Client-Name`.
pub const CLIENT_NAME: &str = "aseko-bridge";

/// Client version sent in `X-Client-Version`.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const X_CLIENT_NAME: HeaderName = HeaderName::from_static("x-client-name");
const X_CLIENT_VERSION: HeaderName = HeaderName::from_static("x-client-version");

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub client_name: String,
    pub client_version: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            client_name: CLIENT_NAME.into(),
            client_version: CLIENT_VERSION.into(),
        }
    }
}

impl TransportConfig {
    /// Headers attached to every request: bearer token, client
    /// identification, and `Accept: application/json`.
    pub fn default_headers(&self, api_key: &SecretString) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::InvalidApiKey(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        headers.insert(X_CLIENT_NAME, header_value(&self.client_name)?);
        headers.insert(X_CLIENT_VERSION, header_value(&self.client_version)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    /// Build a `reqwest::Client` with the authentication headers installed.
    pub fn build_client(&self, api_key: &SecretString) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("{}/{}", self.client_name, self.client_version))
            .default_headers(self.default_headers(api_key)?)
            .build()
            .map_err(Error::from)
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(raw).map_err(|e| Error::Api {
        message: format!("invalid client identification header {raw:?}: {e}"),
        status: None,
    })
}
