use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use stratus_core::config::{AppConfig, ConfigError, LoadOptions};
use stratus_core::secrets::{EnvSecretStore, SecretStore};
use stratus_providers::registry::{CloudBackends, ProviderRegistry};
use stratus_providers::FanOutExecutor;

use crate::handler::RequestHandler;

pub struct Application {
    pub config: AppConfig,
    pub handler: Arc<RequestHandler>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    Ok(bootstrap_with_config(config))
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    let secrets: Arc<dyn SecretStore> =
        Arc::new(EnvSecretStore::new(config.secrets.env_prefix.clone()));

    let mut fanout = FanOutExecutor::new(config.fanout.max_concurrency);
    if let Some(deadline_secs) = config.fanout.deadline_secs {
        fanout = fanout.with_deadline(Duration::from_secs(deadline_secs));
    }

    info!(
        max_concurrency = config.fanout.max_concurrency,
        deadline_secs = config.fanout.deadline_secs,
        debug = config.bot.debug,
        "application wired"
    );

    // The signed AWS transports are injected by embedders; this binary
    // ships with them disabled and answers those commands with a labeled
    // backend error.
    let registry = ProviderRegistry::new(CloudBackends::disabled(), fanout);
    let handler = Arc::new(RequestHandler::new(config.clone(), secrets, registry));

    Application { config, handler }
}

#[cfg(test)]
mod tests {
    use stratus_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::{bootstrap, bootstrap_with_config};

    #[test]
    fn bootstrap_succeeds_on_defaults() {
        let app = bootstrap(LoadOptions::default()).expect("defaults bootstrap");
        assert_eq!(app.config.bot.name, "stratus");
    }

    #[test]
    fn debug_override_reaches_the_wired_config() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides { debug: Some(true), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        })
        .expect("bootstrap");
        assert!(app.config.bot.debug);
    }

    #[test]
    fn prebuilt_config_is_carried_through() {
        let mut config = AppConfig::default();
        config.bot.name = "lookup-bot".to_owned();
        let app = bootstrap_with_config(config);
        assert_eq!(app.config.bot.name, "lookup-bot");
    }
}
