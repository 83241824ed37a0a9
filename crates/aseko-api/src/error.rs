use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// Callers branch on this rather than on individual variants: the
/// aggregator aborts on `Auth`, skips `NotFound` silently, and treats
/// everything else as a per-unit failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials invalid or expired (HTTP 401/403).
    Auth,
    /// Resource absent (HTTP 404).
    NotFound,
    /// Any other non-2xx status, or an aggregate failure.
    Api,
    /// Everything that is not an HTTP status: DNS, connect, TLS, timeout,
    /// an undecodable body, or a request that could not be built.
    Connection,
}

/// Top-level error type for the `aseko-api` crate.
///
/// `aseko-core` maps these into coordinator signals
/// (re-authentication required vs. transient update failure).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API rejected the key (HTTP 401 or 403).
    #[error("{message}")]
    Authentication { message: String },

    // ── Resources ───────────────────────────────────────────────────
    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response, or an aggregate failure raised by `get_units`.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, TLS handshake, timeout, etc.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API key cannot be encoded as a header value.
    #[error("Invalid API key header value: {0}")]
    InvalidApiKey(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify this error into one of the four propagation kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Api { .. } => ErrorKind::Api,
            Self::Connection { .. }
            | Self::InvalidUrl(_)
            | Self::InvalidApiKey(_)
            | Self::Deserialization { .. } => ErrorKind::Connection,
        }
    }

    /// Returns `true` if the API key was rejected and re-authentication
    /// is required.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns `true` for every failure retried on the next refresh cycle.
    ///
    /// Connection and not-found errors count as API errors for
    /// propagation purposes; only authentication failures do not.
    pub fn is_api_error(&self) -> bool {
        !self.is_auth_error()
    }

    /// HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            Self::Connection { source, .. } => {
                source.as_ref().and_then(|e| e.status()).map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub(crate) fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
