/// The validated fields of one inbound chat request.
///
/// Produced by the transport layer after stripping the bot-name and command
/// tokens; lives only for the duration of the request it describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    /// Lowercased command token (`route53`, `ec2`, ...).
    pub command: String,
    /// Whitespace-collapsed remainder of the message text.
    pub search_term: String,
    /// Channel the request came from, without the leading `#`.
    pub channel: String,
    /// Caller's chat handle.
    pub caller: String,
}
