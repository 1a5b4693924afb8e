//! Inventory search providers - the pluggable lookup engines
//!
//! This crate implements one `Provider` per inventory source:
//! - **Route53** (`route53`) - exact-match DNS record search across hosted zones
//! - **EC2** (`ec2`) - tag-filtered instance search, fanned out over all regions
//! - **Droplets** (`droplets`) - DigitalOcean droplet search by name pattern
//! - **SoftLayer** (`softlayer`) - virtual-guest search by hostname pattern
//! - **GCE** (`gce`) - instance search fanned out over the project's zones
//! - **Help** (`help`) - the command listing
//!
//! Plus the plumbing they share:
//! - `fanout` - the bounded-parallel partition query executor
//! - `registry` - command token to provider resolution and construction
//! - `pattern` - the caller-supplied name matcher
//!
//! # Architecture
//!
//! ```text
//! Command token → registry → Provider::run(term) → Vec<Record>
//!                                 ↓ (partitioned sources)
//!                           FanOutExecutor
//! ```
//!
//! Providers are constructed once per request from a resolved secret
//! snapshot, invoked exactly once, and discarded. The signed-SDK transports
//! (AWS) stay behind the `DnsApi`/`ComputeApi` seams; the plain REST
//! backends (DigitalOcean, SoftLayer, GCE) ship with concrete clients.

pub mod droplets;
pub mod ec2;
pub mod fanout;
pub mod gce;
pub mod help;
pub mod pattern;
pub mod registry;
pub mod route53;
pub mod softlayer;

use async_trait::async_trait;
use thiserror::Error;

use stratus_core::config::ConfigError;
use stratus_core::Record;

pub use fanout::FanOutExecutor;
pub use pattern::NamePattern;
pub use registry::{CloudBackends, Command, ProviderRegistry};

/// Error at the backend-API boundary: the inventory source itself failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ApiError(pub String);

impl ApiError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{provider} backend call failed: {source}")]
    Api {
        provider: &'static str,
        #[source]
        source: ApiError,
    },
}

/// One pluggable search implementation against an external inventory source.
///
/// Stateless per invocation: `run` performs a fresh query each time and the
/// returned records are owned solely by the caller. Credentials, if any, are
/// captured at construction from the request's secret snapshot.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in result titles and the help listing.
    fn name(&self) -> &'static str;

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError>;
}
