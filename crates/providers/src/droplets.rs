use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use stratus_core::Record;

use crate::pattern::NamePattern;
use crate::{ApiError, Provider, ProviderError};

const NAME: &str = "Droplets";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Droplet {
    pub name: String,
    pub region: String,
}

#[async_trait]
pub trait DropletApi: Send + Sync {
    async fn list_droplets(&self) -> Result<Vec<Droplet>, ApiError>;
}

/// Droplet search by name pattern; emits `Name` and `Region` per match.
pub struct DropletsProvider {
    api: Arc<dyn DropletApi>,
}

impl DropletsProvider {
    pub fn new(api: Arc<dyn DropletApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Provider for DropletsProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        let pattern = NamePattern::compile(search_term);
        let droplets = self
            .api
            .list_droplets()
            .await
            .map_err(|source| ProviderError::Api { provider: NAME, source })?;

        Ok(droplets
            .into_iter()
            .filter(|droplet| pattern.matches(&droplet.name))
            .map(|droplet| Record::new().with("Name", droplet.name).with("Region", droplet.region))
            .collect())
    }
}

/// Bearer-token REST client for the DigitalOcean droplet listing.
///
/// The token is captured at construction from the request's secret snapshot;
/// its absence surfaces as a configuration failure before this client exists.
pub struct DigitalOceanClient {
    http: reqwest::Client,
    token: SecretString,
    base_url: String,
}

impl DigitalOceanClient {
    pub fn new(http: reqwest::Client, token: SecretString) -> Self {
        Self { http, token, base_url: "https://api.digitalocean.com".to_owned() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct DropletListing {
    droplets: Vec<DropletDto>,
}

#[derive(Debug, Deserialize)]
struct DropletDto {
    name: String,
    region: RegionDto,
}

#[derive(Debug, Deserialize)]
struct RegionDto {
    slug: String,
}

pub(crate) fn transport_error(error: reqwest::Error) -> ApiError {
    ApiError(format!("http request failed: {error}"))
}

#[async_trait]
impl DropletApi for DigitalOceanClient {
    async fn list_droplets(&self) -> Result<Vec<Droplet>, ApiError> {
        let url = format!("{}/v2/droplets?per_page=200", self.base_url);
        let listing: DropletListing = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?
            .json()
            .await
            .map_err(transport_error)?;

        Ok(listing
            .droplets
            .into_iter()
            .map(|dto| Droplet { name: dto.name, region: dto.region.slug })
            .collect())
    }
}
