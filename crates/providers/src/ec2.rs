use std::sync::Arc;

use async_trait::async_trait;

use stratus_core::Record;

use crate::fanout::FanOutExecutor;
use crate::{ApiError, Provider, ProviderError};

const NAME: &str = "EC2";
const REGION_NAME: &str = "EC2Region";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputeInstance {
    pub instance_type: String,
    pub vpc_id: String,
    pub tags: Vec<Tag>,
}

/// Seam over the compute inventory SDK. `running_instances_named` is the
/// provider-side filter: running state plus `tag:Name == name_tag`.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn available_regions(&self) -> Result<Vec<String>, ApiError>;
    async fn running_instances_named(
        &self,
        region: &str,
        name_tag: &str,
    ) -> Result<Vec<ComputeInstance>, ApiError>;
}

async fn region_records(
    api: Arc<dyn ComputeApi>,
    region: String,
    name_tag: String,
) -> Result<Vec<Record>, ApiError> {
    let instances = api.running_instances_named(&region, &name_tag).await?;

    let mut records = Vec::new();
    for instance in instances {
        for tag in &instance.tags {
            if tag.key != "Name" {
                continue;
            }
            records.push(
                Record::new()
                    .with("Name", tag.value.as_str())
                    .with("Type", instance.instance_type.as_str())
                    .with("VPC", instance.vpc_id.as_str())
                    .with("Region", region.as_str()),
            );
        }
    }
    Ok(records)
}

/// Tag-filtered instance search in one fixed region.
pub struct Ec2RegionProvider {
    api: Arc<dyn ComputeApi>,
    region: String,
}

impl Ec2RegionProvider {
    pub fn new(api: Arc<dyn ComputeApi>, region: impl Into<String>) -> Self {
        Self { api, region: region.into() }
    }
}

#[async_trait]
impl Provider for Ec2RegionProvider {
    fn name(&self) -> &'static str {
        REGION_NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        region_records(Arc::clone(&self.api), self.region.clone(), search_term.to_owned())
            .await
            .map_err(|source| ProviderError::Api { provider: REGION_NAME, source })
    }
}

/// Tag-filtered instance search fanned out over every available region.
///
/// Cross-region output order is unspecified; within one region, source order
/// is preserved.
pub struct Ec2Provider {
    api: Arc<dyn ComputeApi>,
    fanout: FanOutExecutor,
}

impl Ec2Provider {
    pub fn new(api: Arc<dyn ComputeApi>, fanout: FanOutExecutor) -> Self {
        Self { api, fanout }
    }
}

#[async_trait]
impl Provider for Ec2Provider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        let api_error = |source| ProviderError::Api { provider: NAME, source };
        let regions = self.api.available_regions().await.map_err(api_error)?;

        self.fanout
            .run(regions, |region| {
                let api = Arc::clone(&self.api);
                let name_tag = search_term.to_owned();
                region_records(api, region, name_tag)
            })
            .await
            .map_err(api_error)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{ComputeApi, ComputeInstance, Ec2Provider, Ec2RegionProvider, Tag};
    use crate::fanout::FanOutExecutor;
    use crate::{ApiError, Provider};

    struct StubCompute {
        regions: Vec<String>,
        instances: HashMap<String, Vec<ComputeInstance>>,
        /// Per-region artificial latency, to vary completion order.
        delay_ms: HashMap<String, u64>,
    }

    #[async_trait]
    impl ComputeApi for StubCompute {
        async fn available_regions(&self) -> Result<Vec<String>, ApiError> {
            Ok(self.regions.clone())
        }

        async fn running_instances_named(
            &self,
            region: &str,
            name_tag: &str,
        ) -> Result<Vec<ComputeInstance>, ApiError> {
            if let Some(&delay) = self.delay_ms.get(region) {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(self
                .instances
                .get(region)
                .map(|instances| {
                    instances
                        .iter()
                        .filter(|instance| {
                            instance.tags.iter().any(|t| t.key == "Name" && t.value == name_tag)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn tagged_instance(name: &str) -> ComputeInstance {
        ComputeInstance {
            instance_type: "t3.small".to_owned(),
            vpc_id: "vpc-1".to_owned(),
            tags: vec![
                Tag { key: "env".to_owned(), value: "prod".to_owned() },
                Tag { key: "Name".to_owned(), value: name.to_owned() },
            ],
        }
    }

    #[tokio::test]
    async fn single_region_emits_name_tagged_instances_only() {
        let api = Arc::new(StubCompute {
            regions: vec!["us-east-1".to_owned()],
            instances: HashMap::from([(
                "us-east-1".to_owned(),
                vec![tagged_instance("web-1")],
            )]),
            delay_ms: HashMap::new(),
        });

        let provider = Ec2RegionProvider::new(api, "us-east-1");
        let records = provider.run("web-1").await.expect("run");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Name"), Some("web-1"));
        assert_eq!(records[0].get("Type"), Some("t3.small"));
        assert_eq!(records[0].get("VPC"), Some("vpc-1"));
        assert_eq!(records[0].get("Region"), Some("us-east-1"));
    }

    #[tokio::test]
    async fn multi_region_merges_only_matching_regions() {
        // Region "a" answers last on purpose; the merged result must not
        // depend on completion order.
        let api = Arc::new(StubCompute {
            regions: vec!["a".to_owned(), "b".to_owned()],
            instances: HashMap::from([("a".to_owned(), vec![tagged_instance("web-1")])]),
            delay_ms: HashMap::from([("a".to_owned(), 20), ("b".to_owned(), 0)]),
        });

        let provider = Ec2Provider::new(api, FanOutExecutor::new(4));
        let records = provider.run("web-1").await.expect("run");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Region"), Some("a"));
    }

    #[tokio::test]
    async fn empty_term_with_no_matches_is_empty_not_an_error() {
        let api = Arc::new(StubCompute {
            regions: vec!["a".to_owned()],
            instances: HashMap::new(),
            delay_ms: HashMap::new(),
        });

        let provider = Ec2Provider::new(api, FanOutExecutor::default());
        let records = provider.run("").await.expect("run");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn one_region_failure_fails_the_search() {
        struct HalfBroken;

        #[async_trait]
        impl ComputeApi for HalfBroken {
            async fn available_regions(&self) -> Result<Vec<String>, ApiError> {
                Ok(vec!["good".to_owned(), "bad".to_owned()])
            }

            async fn running_instances_named(
                &self,
                region: &str,
                _name_tag: &str,
            ) -> Result<Vec<ComputeInstance>, ApiError> {
                if region == "bad" {
                    Err(ApiError::msg("throttled"))
                } else {
                    Ok(Vec::new())
                }
            }
        }

        let provider = Ec2Provider::new(Arc::new(HalfBroken), FanOutExecutor::new(4));
        assert!(provider.run("web-1").await.is_err());
    }
}
