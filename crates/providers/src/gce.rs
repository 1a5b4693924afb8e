use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use stratus_core::Record;

use crate::droplets::transport_error;
use crate::fanout::FanOutExecutor;
use crate::pattern::NamePattern;
use crate::{ApiError, Provider, ProviderError};

const NAME: &str = "GCE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GceInstance {
    pub name: String,
    /// Machine type short name (`e2-medium`), not the full resource URL.
    pub machine_type: String,
    pub status: String,
}

#[async_trait]
pub trait GceApi: Send + Sync {
    async fn list_zones(&self) -> Result<Vec<String>, ApiError>;
    async fn list_instances(&self, zone: &str) -> Result<Vec<GceInstance>, ApiError>;
}

async fn zone_records(
    api: Arc<dyn GceApi>,
    zone: String,
    pattern: NamePattern,
) -> Result<Vec<Record>, ApiError> {
    let instances = api.list_instances(&zone).await?;
    Ok(instances
        .into_iter()
        .filter(|instance| instance.status == "RUNNING" && pattern.matches(&instance.name))
        .map(|instance| {
            Record::new()
                .with("Name", instance.name)
                .with("Type", instance.machine_type)
                .with("Zone", zone.as_str())
        })
        .collect())
}

/// Running-instance search fanned out over every zone of the project.
pub struct GceProvider {
    api: Arc<dyn GceApi>,
    fanout: FanOutExecutor,
}

impl GceProvider {
    pub fn new(api: Arc<dyn GceApi>, fanout: FanOutExecutor) -> Self {
        Self { api, fanout }
    }
}

#[async_trait]
impl Provider for GceProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        let api_error = |source| ProviderError::Api { provider: NAME, source };
        let pattern = NamePattern::compile(search_term);
        let zones = self.api.list_zones().await.map_err(api_error)?;

        self.fanout
            .run(zones, |zone| {
                let api = Arc::clone(&self.api);
                zone_records(api, zone, pattern.clone())
            })
            .await
            .map_err(api_error)
    }
}

/// Bearer-token REST client for the GCE compute API. GCE's REST surface
/// needs no request signing, so unlike the AWS backends it can live here.
pub struct GceRestClient {
    http: reqwest::Client,
    token: SecretString,
    project: String,
    base_url: String,
}

impl GceRestClient {
    pub fn new(http: reqwest::Client, token: SecretString, project: impl Into<String>) -> Self {
        Self {
            http,
            token,
            project: project.into(),
            base_url: "https://compute.googleapis.com/compute/v1".to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_items<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<Vec<T>, ApiError> {
        #[derive(Deserialize)]
        #[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
        struct Listing<T> {
            #[serde(default)]
            items: Vec<T>,
        }

        let listing: Listing<T> = self
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
        Ok(listing.items)
    }
}

#[derive(Debug, Deserialize)]
struct ZoneDto {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceDto {
    name: String,
    machine_type: String,
    status: String,
}

#[async_trait]
impl GceApi for GceRestClient {
    async fn list_zones(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/projects/{}/zones", self.base_url, self.project);
        let zones: Vec<ZoneDto> = self.get_items(url).await?;
        Ok(zones.into_iter().map(|zone| zone.name).collect())
    }

    async fn list_instances(&self, zone: &str) -> Result<Vec<GceInstance>, ApiError> {
        let url = format!("{}/projects/{}/zones/{}/instances", self.base_url, self.project, zone);
        let instances: Vec<InstanceDto> = self.get_items(url).await?;
        Ok(instances
            .into_iter()
            .map(|dto| GceInstance {
                name: dto.name,
                // The API reports machine type as a full resource URL.
                machine_type: dto
                    .machine_type
                    .rsplit('/')
                    .next()
                    .unwrap_or(dto.machine_type.as_str())
                    .to_owned(),
                status: dto.status,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{GceApi, GceInstance, GceProvider};
    use crate::fanout::FanOutExecutor;
    use crate::{ApiError, Provider};

    struct StubGce {
        zones: Vec<String>,
        instances: HashMap<String, Vec<GceInstance>>,
    }

    #[async_trait]
    impl GceApi for StubGce {
        async fn list_zones(&self) -> Result<Vec<String>, ApiError> {
            Ok(self.zones.clone())
        }

        async fn list_instances(&self, zone: &str) -> Result<Vec<GceInstance>, ApiError> {
            Ok(self.instances.get(zone).cloned().unwrap_or_default())
        }
    }

    fn running(name: &str) -> GceInstance {
        GceInstance {
            name: name.to_owned(),
            machine_type: "e2-medium".to_owned(),
            status: "RUNNING".to_owned(),
        }
    }

    #[tokio::test]
    async fn matches_running_instances_across_zones() {
        let api = Arc::new(StubGce {
            zones: vec!["europe-west1-b".to_owned(), "us-central1-a".to_owned()],
            instances: HashMap::from([
                ("europe-west1-b".to_owned(), vec![running("api-1")]),
                (
                    "us-central1-a".to_owned(),
                    vec![running("api-2"), GceInstance {
                        name: "api-3".to_owned(),
                        machine_type: "e2-medium".to_owned(),
                        status: "TERMINATED".to_owned(),
                    }],
                ),
            ]),
        });

        let provider = GceProvider::new(api, FanOutExecutor::new(4));
        let mut names: Vec<String> = provider
            .run("api")
            .await
            .expect("run")
            .iter()
            .filter_map(|record| record.get("Name").map(str::to_owned))
            .collect();
        names.sort();

        assert_eq!(names, vec!["api-1", "api-2"]);
    }

    #[tokio::test]
    async fn empty_project_yields_empty() {
        let api = Arc::new(StubGce { zones: Vec::new(), instances: HashMap::new() });
        let provider = GceProvider::new(api, FanOutExecutor::default());
        assert!(provider.run("").await.expect("run").is_empty());
    }
}
