// ── Account setup and re-authentication ──
//
// Validates a candidate API key and derives the stable account identity
// used to deduplicate configured accounts.

use aseko_api::AsekoClient;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Display title for a configured account.
pub const ENTRY_TITLE: &str = "Aseko Pool";

/// Identity of the account behind an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    /// First paired serial, or a hash of the key for accounts without units.
    pub unique_id: String,
    /// All paired serials, sorted.
    pub serials: Vec<String>,
}

/// Validate `api_key` through `client` and derive the account identity.
///
/// `client` must be built with the same key.
///
/// # Errors
///
/// [`CoreError::InvalidAuth`] when the key is rejected,
/// [`CoreError::CannotConnect`] on any other API failure.
pub async fn validate_account(
    client: &AsekoClient,
    api_key: &SecretString,
) -> Result<AccountIdentity, CoreError> {
    let valid = client.validate_api_key().await.map_err(classify)?;
    if !valid {
        return Err(CoreError::InvalidAuth);
    }

    let serials = client.get_unit_serials().await.map_err(classify)?;
    let unique_id = serials
        .first()
        .cloned()
        .unwrap_or_else(|| fallback_unique_id(api_key));

    debug!(unique_id = %unique_id, units = serials.len(), "account validated");
    Ok(AccountIdentity { unique_id, serials })
}

/// Validate a replacement key for an already-configured account.
///
/// # Errors
///
/// As [`validate_account`], plus [`CoreError::AccountMismatch`] when the
/// key belongs to a different account than `expected_unique_id`.
pub async fn verify_reauth(
    expected_unique_id: &str,
    client: &AsekoClient,
    api_key: &SecretString,
) -> Result<AccountIdentity, CoreError> {
    let identity = validate_account(client, api_key).await?;
    if identity.unique_id != expected_unique_id {
        warn!(
            expected = expected_unique_id,
            actual = %identity.unique_id,
            "re-authentication key belongs to another account"
        );
        return Err(CoreError::AccountMismatch {
            expected: expected_unique_id.to_owned(),
            actual: identity.unique_id,
        });
    }
    Ok(identity)
}

/// `aseko_` followed by the first 12 hex digits of SHA-256 of the key.
///
/// Deterministic, and does not reveal the key.
pub fn fallback_unique_id(api_key: &SecretString) -> String {
    let mut hex = format!("{:x}", Sha256::digest(api_key.expose_secret().as_bytes()));
    hex.truncate(12);
    format!("aseko_{hex}")
}

fn classify(err: aseko_api::Error) -> CoreError {
    if err.is_auth_error() {
        CoreError::InvalidAuth
    } else {
        CoreError::CannotConnect {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_id_is_stable_and_prefixed() {
        let key = SecretString::from("my-secret-key".to_string());
        let a = fallback_unique_id(&key);
        let b = fallback_unique_id(&SecretString::from("my-secret-key".to_string()));

        assert_eq!(a, b);
        assert!(a.starts_with("aseko_"));
        assert_eq!(a.len(), "aseko_".len() + 12);
        assert!(!a.contains("my-secret-key"));
    }

    #[test]
    fn fallback_id_matches_sha256_prefix() {
        // sha256("abc") = ba7816bf8f01cfea...
        let id = fallback_unique_id(&SecretString::from("abc".to_string()));
        assert_eq!(id, "aseko_ba7816bf8f01");
    }

    #[test]
    fn fallback_id_differs_per_key() {
        let a = fallback_unique_id(&SecretString::from("key-one".to_string()));
        let b = fallback_unique_id(&SecretString::from("key-two".to_string()));
        assert_ne!(a, b);
    }
}
