//! Collaborator seams: the chat platform and the SMS gateway.

use crate::channels::inbound::HistoryRecord;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

/// Team chat platform: post announcements and look up stored messages.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post `text` to `channel`. Returns the timestamp the platform assigned, when reported.
    async fn post_message(&self, channel: &str, text: &str) -> Result<Option<String>, ChannelError>;

    /// Fetch the newest message in `channel` at or before `latest_ts` (inclusive, at most one).
    async fn fetch_history_record(
        &self,
        channel: &str,
        latest_ts: &str,
    ) -> Result<Option<HistoryRecord>, ChannelError>;
}

/// Outbound SMS. The sender number is a property of the gateway client.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), ChannelError>;
}
