//! Announcement text for an inbound SMS.

/// `"Text message from {from}: {body}"`, verbatim. The sender sits at word position four;
/// [`crate::relay::extract_phone_number`] reads it back from there.
pub fn format_announcement(from: &str, body: &str) -> String {
    format!("Text message from {}: {}", from, body)
}
