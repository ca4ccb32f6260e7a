//! Request-scoped values passed between the gateway, the relay core, and the providers.

/// Subtype Slack assigns to messages posted by an integration rather than a person.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

/// An SMS delivered by the gateway webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundSmsEvent {
    pub from: String,
    pub body: String,
}

/// A chat message posted inside a thread: the reply payload plus the thread root's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadReply {
    /// Timestamp of the message being replied to (the thread root).
    pub thread_ts: String,
    pub text: String,
    pub channel: String,
}

/// A message as stored in the chat platform's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub text: String,
    pub subtype: Option<String>,
    pub ts: Option<String>,
}

impl HistoryRecord {
    /// True when the record was posted by an integration (this bridge), not a human.
    pub fn is_bot_authored(&self) -> bool {
        self.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE)
    }
}
