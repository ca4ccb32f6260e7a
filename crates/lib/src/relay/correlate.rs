//! Recover the SMS sender behind a chat thread.
//!
//! The thread root is the announcement this bridge posted; its text carries the
//! sender number at a fixed word position. Only bot-authored roots are trusted, so
//! replies never go to a number a person merely typed into the channel.

use crate::channels::{ChannelError, ChatPlatform};
use regex::Regex;
use std::sync::LazyLock;

/// Word runs, keeping a leading `+` so E.164 numbers survive intact. Token positions
/// match plain `\w+` tokenization because `+` never starts a run on its own.
static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\w+").expect("word token pattern is valid"));

/// Index of the sender in "Text message from {from}: {body}".
const SENDER_TOKEN_INDEX: usize = 3;

/// Sender number from announcement text: the fourth word token, unvalidated.
/// Returns `None` when the text has fewer than four tokens.
pub fn extract_phone_number(text: &str) -> Option<String> {
    WORD_TOKEN
        .find_iter(text)
        .nth(SENDER_TOKEN_INDEX)
        .map(|m| m.as_str().to_string())
}

/// Look up the thread root at `thread_ts` in `channel` and read the sender from it.
///
/// `Ok(None)` when the root is missing, was deleted (history returned an older
/// message), was posted by a person, or does not contain enough words.
pub async fn recover_phone_number(
    chat: &dyn ChatPlatform,
    thread_ts: &str,
    channel: &str,
) -> Result<Option<String>, ChannelError> {
    let Some(record) = chat.fetch_history_record(channel, thread_ts).await? else {
        log::debug!("no history at {} in {}", thread_ts, channel);
        return Ok(None);
    };
    if record.ts.as_deref().is_some_and(|ts| ts != thread_ts) {
        log::debug!("thread root {} in {} no longer exists", thread_ts, channel);
        return Ok(None);
    }
    if !record.is_bot_authored() {
        log::debug!("thread root {} in {} is not a bot message", thread_ts, channel);
        return Ok(None);
    }
    Ok(extract_phone_number(&record.text))
}
