use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use stratus_core::Record;

use crate::droplets::transport_error;
use crate::pattern::NamePattern;
use crate::{ApiError, Provider, ProviderError};

const NAME: &str = "SoftLayer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualGuest {
    pub hostname: String,
    pub datacenter: String,
}

#[async_trait]
pub trait VirtualGuestApi: Send + Sync {
    async fn list_virtual_guests(&self) -> Result<Vec<VirtualGuest>, ApiError>;
}

/// Virtual-guest search by hostname pattern; emits `Name` and `Data Center`.
pub struct SoftLayerProvider {
    api: Arc<dyn VirtualGuestApi>,
}

impl SoftLayerProvider {
    pub fn new(api: Arc<dyn VirtualGuestApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Provider for SoftLayerProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        let pattern = NamePattern::compile(search_term);
        let guests = self
            .api
            .list_virtual_guests()
            .await
            .map_err(|source| ProviderError::Api { provider: NAME, source })?;

        Ok(guests
            .into_iter()
            .filter(|guest| pattern.matches(&guest.hostname))
            .map(|guest| {
                Record::new().with("Name", guest.hostname).with("Data Center", guest.datacenter)
            })
            .collect())
    }
}

/// Basic-auth REST client for the SoftLayer account virtual-guest listing.
pub struct SoftLayerClient {
    http: reqwest::Client,
    username: String,
    api_key: SecretString,
    base_url: String,
}

impl SoftLayerClient {
    pub fn new(http: reqwest::Client, username: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http,
            username: username.into(),
            api_key,
            base_url: "https://api.softlayer.com/rest/v3".to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestDto {
    hostname: String,
    datacenter: Option<DatacenterDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatacenterDto {
    long_name: String,
}

#[async_trait]
impl VirtualGuestApi for SoftLayerClient {
    async fn list_virtual_guests(&self) -> Result<Vec<VirtualGuest>, ApiError> {
        let url = format!(
            "{}/SoftLayer_Account/getVirtualGuests.json?objectMask=mask[hostname,datacenter[longName]]",
            self.base_url
        );
        let guests: Vec<GuestDto> = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(self.api_key.expose_secret()))
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?
            .json()
            .await
            .map_err(transport_error)?;

        Ok(guests
            .into_iter()
            .map(|dto| VirtualGuest {
                hostname: dto.hostname,
                datacenter: dto.datacenter.map(|dc| dc.long_name).unwrap_or_default(),
            })
            .collect())
    }
}
