use serde::Deserialize;

use stratus_core::SearchRequest;

/// Raw fields of one inbound slash-command request, as Slack form-encodes
/// them.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SlashPayload {
    pub token: String,
    pub channel_name: String,
    pub user_name: String,
    #[serde(default)]
    pub text: String,
}

/// Turn a raw payload into a `SearchRequest`.
///
/// The message text is whitespace-collapsed, a leading bot-name token (with
/// or without an `@`) is dropped, the next token is the command, and the
/// remainder is the search term. A bare mention with no command defaults to
/// `help`, matching unresolved-command behavior downstream.
pub fn normalize_request(payload: &SlashPayload, bot_name: &str) -> SearchRequest {
    let mut tokens = payload.text.split_whitespace().peekable();
    if let Some(first) = tokens.peek() {
        if first.trim_start_matches('@').eq_ignore_ascii_case(bot_name) {
            tokens.next();
        }
    }

    let command = tokens.next().unwrap_or("help").to_ascii_lowercase();
    let search_term = tokens.collect::<Vec<_>>().join(" ");

    SearchRequest {
        command,
        search_term,
        channel: payload.channel_name.trim_start_matches('#').to_owned(),
        caller: payload.user_name.clone(),
    }
}
