use std::sync::Arc;

use tracing::{error, info, warn};

use stratus_core::config::AppConfig;
use stratus_core::secrets::SecretStore;
use stratus_core::{Outcome, SearchRequest};
use stratus_providers::registry::{Command, ProviderRegistry};
use stratus_providers::ProviderError;
use stratus_slack::payload::{normalize_request, SlashPayload};
use stratus_slack::poster::{DebugSink, DeliverySink, SlackSink};

use crate::auth;

/// End-to-end request orchestrator.
///
/// One request runs fully to completion here: validate the shared secret,
/// resolve the command, build and drain the provider, classify the outcome,
/// and make exactly one delivery-sink call (or none: authentication and
/// pre-sink configuration failures drop the request with a log line only).
/// No error escapes past this type.
pub struct RequestHandler {
    config: AppConfig,
    secrets: Arc<dyn SecretStore>,
    registry: ProviderRegistry,
    http: reqwest::Client,
}

impl RequestHandler {
    pub fn new(
        config: AppConfig,
        secrets: Arc<dyn SecretStore>,
        registry: ProviderRegistry,
    ) -> Self {
        Self { config, secrets, registry, http: reqwest::Client::new() }
    }

    /// Full production path: authenticate, then build the channel sink and
    /// execute. In debug mode the sink is the log, not the network.
    pub async fn handle(&self, payload: SlashPayload) {
        let Some(request) = self.authenticate(&payload) else {
            return;
        };

        let sink: Box<dyn DeliverySink> = if self.config.bot.debug {
            Box::new(DebugSink)
        } else {
            match SlackSink::from_secrets(
                self.http.clone(),
                self.secrets.as_ref(),
                &self.config.bot,
                &request.channel,
            ) {
                Ok(sink) => Box::new(sink),
                Err(config_error) => {
                    // No authenticated channel to answer through; drop.
                    error!(error = %config_error, "delivery sink unavailable, dropping request");
                    return;
                }
            }
        };

        self.execute(&request, sink.as_ref()).await;
    }

    /// Same flow with a caller-supplied sink; the entry point for embedders
    /// and tests.
    pub async fn handle_with_sink(&self, payload: SlashPayload, sink: &dyn DeliverySink) {
        let Some(request) = self.authenticate(&payload) else {
            return;
        };
        self.execute(&request, sink).await;
    }

    /// Secret gate. `None` means the request is dropped: either the token
    /// did not match (silently, so unauthorized callers learn nothing) or
    /// the expected secret itself could not be resolved.
    fn authenticate(&self, payload: &SlashPayload) -> Option<SearchRequest> {
        match auth::verify(self.secrets.as_ref(), &payload.token, self.config.bot.debug) {
            Ok(true) => Some(normalize_request(payload, &self.config.bot.name)),
            Ok(false) => {
                warn!(
                    channel = %payload.channel_name,
                    caller = %payload.user_name,
                    "request secret mismatch, dropping request"
                );
                None
            }
            Err(config_error) => {
                error!(error = %config_error, "expected secret unavailable, dropping request");
                None
            }
        }
    }

    async fn execute(&self, request: &SearchRequest, sink: &dyn DeliverySink) {
        let command = Command::resolve(&request.command);
        info!(
            command = command.token(),
            search_term = %request.search_term,
            channel = %request.channel,
            caller = %request.caller,
            "running lookup"
        );

        let (title, outcome) = self.run_provider(command, &request.search_term).await;
        self.deliver(sink, &title, outcome).await;
    }

    async fn run_provider(&self, command: Command, search_term: &str) -> (String, Outcome) {
        let provider = match self.registry.build(command, self.secrets.as_ref()) {
            Ok(provider) => provider,
            Err(config_error) => {
                return (
                    search_title(command.token(), search_term),
                    Outcome::Configuration { reason: config_error.to_string() },
                );
            }
        };

        let title = search_title(provider.name(), search_term);
        match provider.run(search_term).await {
            Ok(records) => (title, Outcome::from_records(search_term, records)),
            Err(ProviderError::Config(config_error)) => {
                (title, Outcome::Configuration { reason: config_error.to_string() })
            }
            Err(api_error) => (title, Outcome::Provider { reason: api_error.to_string() }),
        }
    }

    async fn deliver(&self, sink: &dyn DeliverySink, title: &str, outcome: Outcome) {
        let delivery = match outcome {
            Outcome::Success(records) => {
                info!(count = records.len(), "delivering records");
                sink.post_results(title, &records).await
            }
            Outcome::NoResults { search_term } => {
                sink.post_error(title, "Not found", &search_term).await
            }
            Outcome::Configuration { reason } => {
                sink.post_error(title, "Configuration error", &reason).await
            }
            Outcome::Provider { reason } => {
                // Operators get the cause; the channel gets a generic line.
                error!(reason = %reason, "provider call failed");
                sink.post_error(
                    title,
                    "Lookup failed",
                    "the inventory backend query failed; details are in the service log",
                )
                .await
            }
        };

        if let Err(delivery_error) = delivery {
            error!(error = %delivery_error, "delivery sink call failed");
        }
    }
}

fn search_title(name: &str, search_term: &str) -> String {
    if search_term.is_empty() {
        format!("{name} search")
    } else {
        format!("{name} search: {search_term}")
    }
}
