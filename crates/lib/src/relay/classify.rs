//! Classify a Slack Events API payload.

use crate::channels::ThreadReply;
use serde_json::Value;

/// What an inbound chat payload asks the bridge to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// URL verification handshake: echo the value as the whole response body.
    Challenge(String),
    /// A message posted in a thread; candidate for relaying back out as SMS.
    Reply(ThreadReply),
    /// Anything else (top-level messages, other event types, malformed payloads).
    Ignored,
}

/// Challenge wins over everything else in the payload. Otherwise only events with
/// a non-empty `event.thread_ts` and `event.text` plus an `event.channel` are replies.
pub fn classify(payload: &Value) -> ChatEvent {
    if let Some(challenge) = payload.get("challenge") {
        let value = match challenge {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return ChatEvent::Challenge(value);
    }
    let Some(event) = payload.get("event") else {
        return ChatEvent::Ignored;
    };
    let Some(thread_ts) = event
        .get("thread_ts")
        .and_then(Value::as_str)
        .filter(|ts| !ts.is_empty())
    else {
        return ChatEvent::Ignored;
    };
    let (Some(text), Some(channel)) = (
        event.get("text").and_then(Value::as_str),
        event.get("channel").and_then(Value::as_str),
    ) else {
        log::debug!("threaded event without text or channel: {}", thread_ts);
        return ChatEvent::Ignored;
    };
    if text.is_empty() {
        // File shares and similar attachments arrive with empty text.
        log::debug!("threaded event with empty text: {}", thread_ts);
        return ChatEvent::Ignored;
    }
    ChatEvent::Reply(ThreadReply {
        thread_ts: thread_ts.to_string(),
        text: text.to_string(),
        channel: channel.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn challenge_is_echoed() {
        assert_eq!(
            classify(&json!({ "challenge": "X" })),
            ChatEvent::Challenge("X".into())
        );
    }

    #[test]
    fn challenge_wins_over_event_fields() {
        let payload = json!({
            "token": "t",
            "type": "url_verification",
            "challenge": "abc123",
            "event": { "thread_ts": "1.0", "text": "hi", "channel": "C1" }
        });
        assert_eq!(classify(&payload), ChatEvent::Challenge("abc123".into()));
    }

    #[test]
    fn non_string_challenge_is_echoed_as_json() {
        assert_eq!(
            classify(&json!({ "challenge": 42 })),
            ChatEvent::Challenge("42".into())
        );
    }

    #[test]
    fn null_challenge_is_echoed_as_empty_body() {
        assert_eq!(
            classify(&json!({ "challenge": null })),
            ChatEvent::Challenge(String::new())
        );
    }

    #[test]
    fn empty_reply_text_is_ignored() {
        let payload = json!({ "event": { "thread_ts": "1.1", "text": "", "channel": "C1" } });
        assert_eq!(classify(&payload), ChatEvent::Ignored);
    }

    #[test]
    fn empty_thread_ts_is_ignored() {
        let payload = json!({ "event": { "thread_ts": "", "text": "hi", "channel": "C1" } });
        assert_eq!(classify(&payload), ChatEvent::Ignored);
    }

    #[test]
    fn top_level_message_is_ignored() {
        let payload = json!({
            "event": { "type": "message", "text": "hello", "channel": "C1", "ts": "2.0" }
        });
        assert_eq!(classify(&payload), ChatEvent::Ignored);
    }

    #[test]
    fn missing_event_is_ignored() {
        assert_eq!(classify(&json!({})), ChatEvent::Ignored);
        assert_eq!(classify(&json!({ "type": "event_callback" })), ChatEvent::Ignored);
        assert_eq!(classify(&json!([1, 2, 3])), ChatEvent::Ignored);
    }

    #[test]
    fn threaded_reply_is_extracted() {
        let payload = json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "thread_ts": "1700000000.000100",
                "ts": "1700000050.000200",
                "text": "call me back",
                "channel": "C123"
            }
        });
        assert_eq!(
            classify(&payload),
            ChatEvent::Reply(ThreadReply {
                thread_ts: "1700000000.000100".into(),
                text: "call me back".into(),
                channel: "C123".into(),
            })
        );
    }

    #[test]
    fn threaded_event_missing_text_is_ignored() {
        let payload = json!({ "event": { "thread_ts": "1.0", "channel": "C1" } });
        assert_eq!(classify(&payload), ChatEvent::Ignored);
    }
}
