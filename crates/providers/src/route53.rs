use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use stratus_core::Record;

use crate::{ApiError, Provider, ProviderError};

const NAME: &str = "Route53";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSet {
    /// Zone-qualified name as returned by the backend, usually with a
    /// trailing `.`.
    pub name: String,
    pub record_type: String,
    pub ttl: Option<u64>,
    pub values: Vec<String>,
}

/// Seam over the DNS inventory SDK. The signed AWS transport lives behind
/// this trait; the provider only consumes final listing results.
#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, ApiError>;
    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<RecordSet>, ApiError>;
}

/// Exact-name DNS record search over every hosted zone, restricted to `A`
/// and `CNAME` sets. One Record per resource-record value.
pub struct Route53Provider {
    api: Arc<dyn DnsApi>,
}

impl Route53Provider {
    pub fn new(api: Arc<dyn DnsApi>) -> Self {
        Self { api }
    }

    fn api_error(&self, source: ApiError) -> ProviderError {
        ProviderError::Api { provider: NAME, source }
    }
}

/// Undo the chat auto-link mangling of host names: `<http://host|host>`
/// arrives as the message text, and the display half after `|` is the term
/// the caller actually typed.
pub(crate) fn normalize_dns_term(term: &str) -> String {
    match term.split_once('|') {
        Some((_, display)) => display.trim_end_matches('>').to_owned(),
        None => term.to_owned(),
    }
}

#[async_trait]
impl Provider for Route53Provider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, search_term: &str) -> Result<Vec<Record>, ProviderError> {
        let term = normalize_dns_term(search_term);
        let zones = self.api.list_hosted_zones().await.map_err(|e| self.api_error(e))?;

        let mut records = Vec::new();
        for zone in zones {
            let sets = self.api.list_record_sets(&zone.id).await.map_err(|e| self.api_error(e))?;
            for set in sets {
                if set.name.trim_end_matches('.') != term {
                    continue;
                }
                if set.record_type != "A" && set.record_type != "CNAME" {
                    continue;
                }
                if set.values.is_empty() {
                    // Alias sets carry no resource records; skip, not an error.
                    debug!(zone = %zone.name, record_set = %set.name, "record set has no resource records");
                    continue;
                }

                let ttl = set.ttl.map(|ttl| ttl.to_string()).unwrap_or_default();
                for value in &set.values {
                    records.push(
                        Record::new()
                            .with("Type", set.record_type.as_str())
                            .with("TTL", ttl.as_str())
                            .with("Value", value.as_str()),
                    );
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use stratus_core::Record;

    use super::{normalize_dns_term, DnsApi, HostedZone, RecordSet, Route53Provider};
    use crate::{ApiError, Provider, ProviderError};

    struct StubDns {
        zones: Vec<HostedZone>,
        sets: Vec<RecordSet>,
    }

    #[async_trait]
    impl DnsApi for StubDns {
        async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, ApiError> {
            Ok(self.zones.clone())
        }

        async fn list_record_sets(&self, _zone_id: &str) -> Result<Vec<RecordSet>, ApiError> {
            Ok(self.sets.clone())
        }
    }

    fn single_zone(sets: Vec<RecordSet>) -> Route53Provider {
        Route53Provider::new(Arc::new(StubDns {
            zones: vec![HostedZone { id: "Z1".to_owned(), name: "example.com.".to_owned() }],
            sets,
        }))
    }

    #[test]
    fn chat_escaped_terms_normalize_to_the_display_half() {
        assert_eq!(normalize_dns_term("<http://example.com|example.com>"), "example.com");
        assert_eq!(normalize_dns_term("example.com"), "example.com");
    }

    #[tokio::test]
    async fn exact_match_emits_one_record_per_value() {
        let provider = single_zone(vec![RecordSet {
            name: "example.com.".to_owned(),
            record_type: "A".to_owned(),
            ttl: Some(300),
            values: vec!["1.2.3.4".to_owned()],
        }]);

        let records = provider.run("example.com").await.expect("run");
        assert_eq!(
            records,
            vec![Record::new().with("Type", "A").with("TTL", "300").with("Value", "1.2.3.4")]
        );
    }

    #[tokio::test]
    async fn non_address_types_and_other_names_are_filtered_out() {
        let provider = single_zone(vec![
            RecordSet {
                name: "example.com.".to_owned(),
                record_type: "TXT".to_owned(),
                ttl: Some(60),
                values: vec!["v=spf1".to_owned()],
            },
            RecordSet {
                name: "other.example.com.".to_owned(),
                record_type: "A".to_owned(),
                ttl: Some(60),
                values: vec!["5.6.7.8".to_owned()],
            },
            RecordSet {
                name: "example.com.".to_owned(),
                record_type: "CNAME".to_owned(),
                ttl: Some(120),
                values: vec!["edge.example.net".to_owned()],
            },
        ]);

        let records = provider.run("example.com").await.expect("run");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Type"), Some("CNAME"));
        assert_eq!(records[0].get("Value"), Some("edge.example.net"));
    }

    #[tokio::test]
    async fn empty_resource_record_sets_are_skipped_not_errors() {
        let provider = single_zone(vec![RecordSet {
            name: "example.com.".to_owned(),
            record_type: "A".to_owned(),
            ttl: None,
            values: Vec::new(),
        }]);

        let records = provider.run("example.com").await.expect("run");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn empty_term_over_empty_backend_yields_empty() {
        let provider = Route53Provider::new(Arc::new(StubDns { zones: Vec::new(), sets: Vec::new() }));
        let records = provider.run("").await.expect("run");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_provider_api_error() {
        struct FailingDns;

        #[async_trait]
        impl DnsApi for FailingDns {
            async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, ApiError> {
                Err(ApiError::msg("access denied"))
            }

            async fn list_record_sets(&self, _zone_id: &str) -> Result<Vec<RecordSet>, ApiError> {
                Ok(Vec::new())
            }
        }

        let provider = Route53Provider::new(Arc::new(FailingDns));
        let error = provider.run("example.com").await.expect_err("must fail");
        assert!(matches!(error, ProviderError::Api { provider: "Route53", .. }));
    }
}
