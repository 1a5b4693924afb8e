use secrecy::ExposeSecret;

use stratus_core::config::ConfigError;
use stratus_core::secrets::{keys, SecretStore};

/// Check the supplied request token against the expected shared secret.
///
/// Debug mode is always valid (local dry runs never reach the network).
/// A failure to decrypt the expected secret is a configuration error, not an
/// authentication mismatch - operators need to tell the two apart.
pub fn verify(
    secrets: &dyn SecretStore,
    supplied: &str,
    debug: bool,
) -> Result<bool, ConfigError> {
    if debug {
        return Ok(true);
    }
    let expected = secrets.decrypt(keys::SLACK_EXPECTED_TOKEN)?;
    Ok(expected.expose_secret() == supplied)
}
