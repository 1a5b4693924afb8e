use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use stratus_core::config::{BotConfig, ConfigError};
use stratus_core::secrets::{keys, SecretStore};
use stratus_core::Record;

use crate::attachments::{self, Attachment};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("chat post failed: {0}")]
    Transport(String),
    #[error("chat api rejected the message: {0}")]
    Rejected(String),
}

/// One-way sink the orchestrator hands classified outcomes to. Implementors
/// render and deliver; nothing flows back to the request.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn post_results(&self, title: &str, records: &[Record]) -> Result<(), DeliveryError>;

    async fn post_error(
        &self,
        title: &str,
        error_title: &str,
        detail: &str,
    ) -> Result<(), DeliveryError>;
}

/// Posts to a channel via `chat.postMessage`. The API token comes from the
/// request's secret snapshot at construction; a missing token is a
/// configuration failure before any message exists.
pub struct SlackSink {
    http: reqwest::Client,
    api_token: SecretString,
    channel: String,
    bot_name: String,
    icon_url: Option<String>,
}

impl SlackSink {
    pub fn from_secrets(
        http: reqwest::Client,
        secrets: &dyn SecretStore,
        bot: &BotConfig,
        channel: &str,
    ) -> Result<Self, ConfigError> {
        let api_token = secrets.decrypt(keys::SLACK_API_TOKEN)?;
        Ok(Self {
            http,
            api_token,
            channel: channel.to_owned(),
            bot_name: bot.name.clone(),
            icon_url: bot.icon_url.clone(),
        })
    }

    fn message_body(&self, title: &str, attachments: &[Attachment]) -> serde_json::Value {
        let mut body = json!({
            "channel": format!("#{}", self.channel),
            "text": title,
            "username": self.bot_name,
            "as_user": false,
            "attachments": attachments,
        });
        if let Some(icon_url) = &self.icon_url {
            body["icon_url"] = json!(icon_url);
        }
        body
    }

    async fn post(&self, title: &str, attachments: &[Attachment]) -> Result<(), DeliveryError> {
        #[derive(Deserialize)]
        struct PostResponse {
            ok: bool,
            error: Option<String>,
        }

        let response: PostResponse = self
            .http
            .post(POST_MESSAGE_URL)
            .bearer_auth(self.api_token.expose_secret())
            .json(&self.message_body(title, attachments))
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?
            .json()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        if response.ok {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(response.error.unwrap_or_else(|| "unknown".to_owned())))
        }
    }
}

#[async_trait]
impl DeliverySink for SlackSink {
    async fn post_results(&self, title: &str, records: &[Record]) -> Result<(), DeliveryError> {
        self.post(title, &attachments::results_attachments(records)).await
    }

    async fn post_error(
        &self,
        title: &str,
        error_title: &str,
        detail: &str,
    ) -> Result<(), DeliveryError> {
        self.post(title, &[attachments::error_attachment(error_title, detail)]).await
    }
}

/// Debug-mode sink: emits the same structured payload to the log instead of
/// the network. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugSink;

#[async_trait]
impl DeliverySink for DebugSink {
    async fn post_results(&self, title: &str, records: &[Record]) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(&attachments::results_attachments(records))
            .unwrap_or_else(|_| "<unserializable>".to_owned());
        info!(title, payload = %payload, "debug delivery: results");
        Ok(())
    }

    async fn post_error(
        &self,
        title: &str,
        error_title: &str,
        detail: &str,
    ) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(&attachments::error_attachment(error_title, detail))
            .unwrap_or_else(|_| "<unserializable>".to_owned());
        info!(title, payload = %payload, "debug delivery: error");
        Ok(())
    }
}
