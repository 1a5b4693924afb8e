//! Slack Integration - inbound payload normalization and outbound delivery
//!
//! This crate provides the chat-facing edges of stratus:
//! - **Payload** (`payload`) - decodes the slash-command form body and strips
//!   the bot-name/command tokens into a `SearchRequest`
//! - **Attachments** (`attachments`) - good/danger colored message payloads
//!   built from normalized Records
//! - **Poster** (`poster`) - the `DeliverySink` trait with a `chat.postMessage`
//!   implementation and a log-only debug implementation

pub mod attachments;
pub mod payload;
pub mod poster;

pub use payload::{normalize_request, SlashPayload};
pub use poster::{DebugSink, DeliveryError, DeliverySink, SlackSink};
