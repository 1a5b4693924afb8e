use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub fanout: FanoutConfig,
    pub secrets: SecretsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Name the bot answers to; the leading token of every command message.
    pub name: String,
    pub icon_url: Option<String>,
    /// Debug mode skips secret validation and posts to the log instead of
    /// the chat channel.
    pub debug: bool,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct FanoutConfig {
    /// Worker ceiling for region/zone fan-out.
    pub max_concurrency: usize,
    /// Overall wall-clock bound for one fan-out, if any.
    pub deadline_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SecretsConfig {
    /// Environment prefix the secret store resolves keys under.
    pub env_prefix: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub debug: Option<bool>,
    pub bot_name: Option<String>,
    pub log_level: Option<String>,
    pub secret_env_prefix: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
    #[error("missing configuration key `{0}`")]
    MissingKey(String),
    #[error("could not decrypt configuration key `{key}`: {reason}")]
    Decrypt { key: String, reason: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig { name: "stratus".to_string(), icon_url: None, debug: false },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            fanout: FanoutConfig { max_concurrency: 15, deadline_secs: None },
            secrets: SecretsConfig { env_prefix: "STRATUS_SECRET_".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("stratus.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(bot) = patch.bot {
            if let Some(name) = bot.name {
                self.bot.name = name;
            }
            if let Some(icon_url) = bot.icon_url {
                self.bot.icon_url = Some(icon_url);
            }
            if let Some(debug) = bot.debug {
                self.bot.debug = debug;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(fanout) = patch.fanout {
            if let Some(max_concurrency) = fanout.max_concurrency {
                self.fanout.max_concurrency = max_concurrency;
            }
            if let Some(deadline_secs) = fanout.deadline_secs {
                self.fanout.deadline_secs = Some(deadline_secs);
            }
        }

        if let Some(secrets) = patch.secrets {
            if let Some(env_prefix) = secrets.env_prefix {
                self.secrets.env_prefix = env_prefix;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STRATUS_BOT_NAME") {
            self.bot.name = value;
        }
        if let Some(value) = read_env("STRATUS_BOT_ICON_URL") {
            self.bot.icon_url = Some(value);
        }
        if let Some(value) = read_env("STRATUS_DEBUG") {
            self.bot.debug = parse_bool("STRATUS_DEBUG", &value)?;
        }

        if let Some(value) = read_env("STRATUS_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STRATUS_SERVER_PORT") {
            self.server.port = parse_u16("STRATUS_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("STRATUS_FANOUT_MAX_CONCURRENCY") {
            self.fanout.max_concurrency =
                parse_u64("STRATUS_FANOUT_MAX_CONCURRENCY", &value)? as usize;
        }
        if let Some(value) = read_env("STRATUS_FANOUT_DEADLINE_SECS") {
            self.fanout.deadline_secs = Some(parse_u64("STRATUS_FANOUT_DEADLINE_SECS", &value)?);
        }

        if let Some(value) = read_env("STRATUS_SECRETS_ENV_PREFIX") {
            self.secrets.env_prefix = value;
        }

        if let Some(value) = read_env("STRATUS_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("STRATUS_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(debug) = overrides.debug {
            self.bot.debug = debug;
        }
        if let Some(bot_name) = overrides.bot_name {
            self.bot.name = bot_name;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(secret_env_prefix) = overrides.secret_env_prefix {
            self.secrets.env_prefix = secret_env_prefix;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.trim().is_empty() {
            return Err(ConfigError::Validation("bot.name must not be empty".to_string()));
        }
        if self.fanout.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "fanout.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.fanout.deadline_secs == Some(0) {
            return Err(ConfigError::Validation(
                "fanout.deadline_secs must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    bot: Option<BotPatch>,
    server: Option<ServerPatch>,
    fanout: Option<FanoutPatch>,
    secrets: Option<SecretsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Deserialize)]
struct BotPatch {
    name: Option<String>,
    icon_url: Option<String>,
    debug: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct FanoutPatch {
    max_concurrency: Option<usize>,
    deadline_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SecretsPatch {
    env_prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    let default = PathBuf::from("stratus.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_owned(), value: value.to_owned() }),
    }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
