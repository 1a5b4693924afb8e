use std::collections::HashMap;
use std::env;

use secrecy::SecretString;

use crate::config::ConfigError;

/// Well-known secret keys, shared vocabulary between the store's producers
/// and consumers.
pub mod keys {
    pub const SLACK_EXPECTED_TOKEN: &str = "slack_expected_token";
    pub const SLACK_API_TOKEN: &str = "slack_api_token";
    pub const DIGITALOCEAN_TOKEN: &str = "digitalocean_token";
    pub const SOFTLAYER_USERNAME: &str = "softlayer_username";
    pub const SOFTLAYER_API_KEY: &str = "softlayer_api_key";
    pub const GCE_ACCESS_TOKEN: &str = "gce_access_token";
    pub const GCE_PROJECT: &str = "gce_project";
}

/// Seam over the external secret storage/decryption service.
///
/// The store is resolved once per request into a read-only snapshot; every
/// component that needs a credential receives it explicitly, nothing reads
/// secrets through globals.
pub trait SecretStore: Send + Sync {
    /// Decrypt the value under `key`. Absence or a decryption failure is a
    /// configuration error, never an empty default.
    fn decrypt(&self, key: &str) -> Result<SecretString, ConfigError>;

    /// Plaintext lookup with a fallback for optional, non-secret keys.
    fn get(&self, key: &str, default: &str) -> String;

    fn contains(&self, key: &str) -> bool;
}

/// Process-environment backed store. A key `digitalocean_token` resolves to
/// the variable `{prefix}DIGITALOCEAN_TOKEN`.
#[derive(Clone, Debug)]
pub struct EnvSecretStore {
    prefix: String,
}

impl EnvSecretStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn variable(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_ascii_uppercase())
    }

    fn read(&self, key: &str) -> Option<String> {
        env::var(self.variable(key)).ok().filter(|value| !value.trim().is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn decrypt(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.read(key)
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingKey(key.to_owned()))
    }

    fn get(&self, key: &str, default: &str) -> String {
        self.read(key).unwrap_or_else(|| default.to_owned())
    }

    fn contains(&self, key: &str) -> bool {
        self.read(key).is_some()
    }
}

/// In-memory store for tests and local dry runs.
#[derive(Clone, Debug, Default)]
pub struct StaticSecretStore {
    values: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn decrypt(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.values
            .get(key)
            .cloned()
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingKey(key.to_owned()))
    }

    fn get(&self, key: &str, default: &str) -> String {
        self.values.get(key).cloned().unwrap_or_else(|| default.to_owned())
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::{SecretStore, StaticSecretStore};
    use crate::config::ConfigError;

    #[test]
    fn static_store_decrypts_known_keys() {
        let store = StaticSecretStore::new().with("slack_api_token", "xoxb-1");
        let secret = store.decrypt("slack_api_token").expect("known key");
        assert_eq!(secret.expose_secret(), "xoxb-1");
        assert!(store.contains("slack_api_token"));
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let store = StaticSecretStore::new();
        let error = store.decrypt("digitalocean_token").expect_err("must fail");
        assert!(matches!(error, ConfigError::MissingKey(key) if key == "digitalocean_token"));
    }

    #[test]
    fn get_falls_back_to_the_default() {
        let store = StaticSecretStore::new().with("bot_name", "stratus");
        assert_eq!(store.get("bot_name", "fallback"), "stratus");
        assert_eq!(store.get("icon_url", ""), "");
    }
}
