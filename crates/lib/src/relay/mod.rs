//! Relay core: SMS into the chat channel, threaded chat replies back out as SMS.
//!
//! Each direction returns its failures as [`RelayError`]. Suppressing them so the
//! providers never see an error (and never retry into duplicates) is the gateway's job.

mod announce;
mod classify;
mod correlate;

pub use announce::format_announcement;
pub use classify::{classify, ChatEvent};
pub use correlate::{extract_phone_number, recover_phone_number};

use crate::channels::{ChannelError, ChatPlatform, InboundSmsEvent, SmsGateway};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("posting announcement to {channel}: {source}")]
    Announce {
        channel: String,
        #[source]
        source: ChannelError,
    },

    #[error("looking up thread root {thread_ts} in {channel}: {source}")]
    HistoryLookup {
        channel: String,
        thread_ts: String,
        #[source]
        source: ChannelError,
    },

    #[error("sending SMS to {to}: {source}")]
    SendSms {
        to: String,
        #[source]
        source: ChannelError,
    },
}

/// Result of handling one chat payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRelayOutcome {
    /// Verification handshake; the value is the response body.
    Challenge(String),
    /// Reply text was sent as SMS to `to`.
    Relayed { to: String },
    /// Threaded reply whose root carries no recoverable sender.
    Unroutable,
    /// Not a threaded reply.
    Ignored,
}

/// Announce an inbound SMS in `channel`.
pub async fn relay_sms_to_chat(
    chat: &dyn ChatPlatform,
    channel: &str,
    sms: &InboundSmsEvent,
) -> Result<(), RelayError> {
    let text = format_announcement(&sms.from, &sms.body);
    let ts = chat
        .post_message(channel, &text)
        .await
        .map_err(|source| RelayError::Announce {
            channel: channel.to_string(),
            source,
        })?;
    log::info!(
        "relayed SMS from {} to {} (ts {})",
        sms.from,
        channel,
        ts.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

/// Classify a chat payload and, for a reply to one of our announcements, text the reply
/// back to the original sender.
pub async fn relay_chat_event(
    chat: &dyn ChatPlatform,
    sms: &dyn SmsGateway,
    payload: &Value,
) -> Result<ChatRelayOutcome, RelayError> {
    let reply = match classify(payload) {
        ChatEvent::Challenge(value) => return Ok(ChatRelayOutcome::Challenge(value)),
        ChatEvent::Ignored => return Ok(ChatRelayOutcome::Ignored),
        ChatEvent::Reply(reply) => reply,
    };
    let to = recover_phone_number(chat, &reply.thread_ts, &reply.channel)
        .await
        .map_err(|source| RelayError::HistoryLookup {
            channel: reply.channel.clone(),
            thread_ts: reply.thread_ts.clone(),
            source,
        })?;
    let Some(to) = to else {
        log::debug!(
            "reply in thread {} has no routable sender",
            reply.thread_ts
        );
        return Ok(ChatRelayOutcome::Unroutable);
    };
    sms.send_sms(&to, &reply.text)
        .await
        .map_err(|source| RelayError::SendSms {
            to: to.clone(),
            source,
        })?;
    log::info!("relayed reply in thread {} to {}", reply.thread_ts, to);
    Ok(ChatRelayOutcome::Relayed { to })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory providers for exercising the relay without HTTP.

    use crate::channels::{ChannelError, ChatPlatform, HistoryRecord, SmsGateway};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeChat {
        history: Option<HistoryRecord>,
        fail: bool,
        posts: Mutex<Vec<(String, String)>>,
        lookups: Mutex<Vec<(String, String)>>,
    }

    impl FakeChat {
        pub fn with_history(record: HistoryRecord) -> Self {
            Self {
                history: Some(record),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn posts(&self) -> Vec<(String, String)> {
            self.posts.lock().unwrap().clone()
        }

        pub fn history_lookups(&self) -> Vec<(String, String)> {
            self.lookups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatPlatform for FakeChat {
        async fn post_message(
            &self,
            channel: &str,
            text: &str,
        ) -> Result<Option<String>, ChannelError> {
            if self.fail {
                return Err(ChannelError::Api("not_authed".into()));
            }
            self.posts
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            Ok(Some("1700000000.000100".into()))
        }

        async fn fetch_history_record(
            &self,
            channel: &str,
            latest_ts: &str,
        ) -> Result<Option<HistoryRecord>, ChannelError> {
            if self.fail {
                return Err(ChannelError::Api("not_authed".into()));
            }
            self.lookups
                .lock()
                .unwrap()
                .push((channel.to_string(), latest_ts.to_string()));
            Ok(self.history.clone())
        }
    }

    #[derive(Default)]
    pub struct FakeSms {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl FakeSms {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SmsGateway for FakeSms {
        async fn send_sms(&self, to: &str, body: &str) -> Result<(), ChannelError> {
            if self.fail {
                return Err(ChannelError::Api("sending SMS failed: 500".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }
}
