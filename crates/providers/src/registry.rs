use std::sync::Arc;

use async_trait::async_trait;

use stratus_core::config::ConfigError;
use stratus_core::secrets::{keys, SecretStore};

use crate::droplets::{DigitalOceanClient, DropletsProvider};
use crate::ec2::{ComputeApi, ComputeInstance, Ec2Provider};
use crate::fanout::FanOutExecutor;
use crate::gce::{GceProvider, GceRestClient};
use crate::help::HelpProvider;
use crate::route53::{DnsApi, HostedZone, RecordSet, Route53Provider};
use crate::softlayer::{SoftLayerClient, SoftLayerProvider};
use crate::{ApiError, Provider};

/// The closed set of chat commands. Resolution is a compile-time-checked
/// variant table; unrecognized tokens fall back to `Help`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Route53,
    Ec2,
    Droplets,
    SoftLayer,
    Gce,
    Help,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Route53,
        Command::Ec2,
        Command::Droplets,
        Command::SoftLayer,
        Command::Gce,
        Command::Help,
    ];

    pub fn resolve(token: &str) -> Command {
        match token.trim().to_ascii_lowercase().as_str() {
            "route53" => Command::Route53,
            "ec2" => Command::Ec2,
            "droplets" => Command::Droplets,
            "sl" | "softlayer" => Command::SoftLayer,
            "gce" => Command::Gce,
            _ => Command::Help,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Command::Route53 => "route53",
            Command::Ec2 => "ec2",
            Command::Droplets => "droplets",
            Command::SoftLayer => "sl",
            Command::Gce => "gce",
            Command::Help => "help",
        }
    }

    /// One-line usage text for the help listing.
    pub fn describe(&self) -> &'static str {
        match self {
            Command::Route53 => "<dns-name>: exact-match A/CNAME records across hosted zones",
            Command::Ec2 => "<name-tag>: running instances with that Name tag, all regions",
            Command::Droplets => "<pattern>: droplets whose name matches the pattern",
            Command::SoftLayer => "<pattern>: virtual guests whose hostname matches the pattern",
            Command::Gce => "<pattern>: running GCE instances matching the pattern, all zones",
            Command::Help => "list available commands",
        }
    }
}

/// Injected SDK-backed inventory transports. Route53 and EC2 need signed
/// requests, which is the out-of-scope SDK layer; embedders wire real
/// implementations here, and the default wiring answers with a labeled
/// backend error.
#[derive(Clone)]
pub struct CloudBackends {
    pub dns: Arc<dyn DnsApi>,
    pub compute: Arc<dyn ComputeApi>,
}

impl CloudBackends {
    pub fn disabled() -> Self {
        Self {
            dns: Arc::new(DisabledBackend("route53")),
            compute: Arc::new(DisabledBackend("ec2")),
        }
    }
}

struct DisabledBackend(&'static str);

impl DisabledBackend {
    fn error(&self) -> ApiError {
        ApiError(format!("{} backend transport is not wired in this build", self.0))
    }
}

#[async_trait]
impl DnsApi for DisabledBackend {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, ApiError> {
        Err(self.error())
    }

    async fn list_record_sets(&self, _zone_id: &str) -> Result<Vec<RecordSet>, ApiError> {
        Err(self.error())
    }
}

#[async_trait]
impl ComputeApi for DisabledBackend {
    async fn available_regions(&self) -> Result<Vec<String>, ApiError> {
        Err(self.error())
    }

    async fn running_instances_named(
        &self,
        _region: &str,
        _name_tag: &str,
    ) -> Result<Vec<ComputeInstance>, ApiError> {
        Err(self.error())
    }
}

/// Builds the provider for a resolved command from the request's secret
/// snapshot. Per-provider credential lookups happen here, so a missing key
/// surfaces as a `ConfigError` at construction, before any backend call.
pub struct ProviderRegistry {
    backends: CloudBackends,
    http: reqwest::Client,
    fanout: FanOutExecutor,
}

impl ProviderRegistry {
    pub fn new(backends: CloudBackends, fanout: FanOutExecutor) -> Self {
        Self { backends, http: reqwest::Client::new(), fanout }
    }

    pub fn build(
        &self,
        command: Command,
        secrets: &dyn SecretStore,
    ) -> Result<Box<dyn Provider>, ConfigError> {
        match command {
            Command::Route53 => {
                Ok(Box::new(Route53Provider::new(Arc::clone(&self.backends.dns))))
            }
            Command::Ec2 => Ok(Box::new(Ec2Provider::new(
                Arc::clone(&self.backends.compute),
                self.fanout.clone(),
            ))),
            Command::Droplets => {
                let token = secrets.decrypt(keys::DIGITALOCEAN_TOKEN)?;
                let client = DigitalOceanClient::new(self.http.clone(), token);
                Ok(Box::new(DropletsProvider::new(Arc::new(client))))
            }
            Command::SoftLayer => {
                if !secrets.contains(keys::SOFTLAYER_USERNAME) {
                    return Err(ConfigError::MissingKey(keys::SOFTLAYER_USERNAME.to_owned()));
                }
                let username = secrets.get(keys::SOFTLAYER_USERNAME, "");
                let api_key = secrets.decrypt(keys::SOFTLAYER_API_KEY)?;
                let client = SoftLayerClient::new(self.http.clone(), username, api_key);
                Ok(Box::new(SoftLayerProvider::new(Arc::new(client))))
            }
            Command::Gce => {
                let token = secrets.decrypt(keys::GCE_ACCESS_TOKEN)?;
                if !secrets.contains(keys::GCE_PROJECT) {
                    return Err(ConfigError::MissingKey(keys::GCE_PROJECT.to_owned()));
                }
                let project = secrets.get(keys::GCE_PROJECT, "");
                let client = GceRestClient::new(self.http.clone(), token, project);
                Ok(Box::new(GceProvider::new(Arc::new(client), self.fanout.clone())))
            }
            Command::Help => Ok(Box::new(HelpProvider::registered())),
        }
    }
}
