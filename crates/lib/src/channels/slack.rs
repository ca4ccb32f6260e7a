//! Slack channel: chat.postMessage for announcements, conversations.history for thread roots.

use crate::channels::handle::{ChannelError, ChatPlatform};
use crate::channels::inbound::HistoryRecord;
use async_trait::async_trait;
use serde::Deserialize;

const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

#[derive(Debug, Deserialize)]
struct SlackMessage {
    #[serde(default)]
    text: String,
    subtype: Option<String>,
    ts: Option<String>,
}

impl From<SlackMessage> for HistoryRecord {
    fn from(m: SlackMessage) -> Self {
        HistoryRecord {
            text: m.text,
            subtype: m.subtype,
            ts: m.ts,
        }
    }
}

fn api_error(error: Option<String>) -> ChannelError {
    ChannelError::Api(error.unwrap_or_else(|| "unknown error".into()))
}

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(token: Option<String>, api_base: Option<String>) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| SLACK_API_BASE.to_string());
        Self {
            api_base,
            token,
            client: reqwest::Client::new(),
        }
    }

    fn token(&self) -> Result<&str, ChannelError> {
        self.token
            .as_deref()
            .ok_or(ChannelError::NotConfigured("slack bot token"))
    }

    /// POST chat.postMessage. Returns the `ts` of the new message.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<Option<String>, ChannelError> {
        let token = self.token()?;
        let body = serde_json::json!({ "channel": channel, "text": text });
        let res = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!(
                "chat.postMessage failed: {} {}",
                status, body
            )));
        }
        let parsed: PostMessageResponse = res.json().await?;
        if !parsed.ok {
            return Err(api_error(parsed.error));
        }
        Ok(parsed.ts)
    }

    /// GET conversations.history with `latest=ts`, `inclusive=true`, `limit=1`: the message at
    /// `ts`, or the newest one before it when `ts` no longer exists.
    pub async fn history_at(
        &self,
        channel: &str,
        latest_ts: &str,
    ) -> Result<Option<HistoryRecord>, ChannelError> {
        let token = self.token()?;
        let res = self
            .client
            .get(format!("{}/conversations.history", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("channel", channel),
                ("latest", latest_ts),
                ("limit", "1"),
                ("inclusive", "true"),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!(
                "conversations.history failed: {} {}",
                status, body
            )));
        }
        let parsed: HistoryResponse = res.json().await?;
        if !parsed.ok {
            return Err(api_error(parsed.error));
        }
        Ok(parsed.messages.into_iter().next().map(HistoryRecord::from))
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<Option<String>, ChannelError> {
        SlackClient::post_message(self, channel, text).await
    }

    async fn fetch_history_record(
        &self,
        channel: &str,
        latest_ts: &str,
    ) -> Result<Option<HistoryRecord>, ChannelError> {
        self.history_at(channel, latest_ts).await
    }
}
