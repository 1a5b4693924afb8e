use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Form, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use stratus_slack::payload::SlashPayload;

use crate::handler::RequestHandler;

pub fn router(handler: Arc<RequestHandler>) -> Router {
    Router::new()
        .route("/commands", post(command))
        .route("/health", get(health))
        .with_state(handler)
}

/// Inbound slash-command webhook. Chat transports expect an ack within a
/// few seconds, so the lookup runs detached and answers through the sink.
async fn command(
    State(handler): State<Arc<RequestHandler>>,
    Form(payload): Form<SlashPayload>,
) -> StatusCode {
    debug!(channel = %payload.channel_name, "command payload accepted");
    tokio::spawn(async move { handler.handle(payload).await });
    StatusCode::OK
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checked_at: String,
}

async fn health() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok", checked_at: Utc::now().to_rfc3339() }))
}

#[cfg(test)]
mod tests {
    use super::health;

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = health().await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body.0.status, "ok");
    }
}
