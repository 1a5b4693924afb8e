//! Shared domain types for stratus.
//!
//! This crate holds the pieces every other crate agrees on:
//! - **Record** (`record`) - the normalized search result row
//! - **SearchRequest** (`request`) - one validated inbound request
//! - **Outcome** (`outcome`) - the classified result of one request
//! - **SecretStore** (`secrets`) - the secret decryption seam
//! - **AppConfig** (`config`) - layered application configuration

pub mod config;
pub mod outcome;
pub mod record;
pub mod request;
pub mod secrets;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use outcome::Outcome;
pub use record::Record;
pub use request::SearchRequest;
pub use secrets::{EnvSecretStore, SecretStore, StaticSecretStore};
