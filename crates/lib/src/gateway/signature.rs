//! Slack request signing (`X-Slack-Signature`, `X-Slack-Request-Timestamp`).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Requests older (or newer) than this are rejected as replays.
const MAX_TIMESTAMP_SKEW_SECS: u64 = 300;

pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Check `v0=hex(HMAC-SHA256(secret, "v0:{timestamp}:{body}"))` against `signature`,
/// rejecting timestamps more than five minutes away from `now_secs`.
pub fn verify_slack_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_secs: u64,
) -> bool {
    let Ok(ts) = timestamp.trim().parse::<u64>() else {
        return false;
    };
    if now_secs.abs_diff(ts) > MAX_TIMESTAMP_SKEW_SECS {
        return false;
    }
    let Ok(mut mac) = HmacSha256::new_from_slice(signing_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("v0:{}:", timestamp.trim()).as_bytes());
    mac.update(body);
    let expected = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

    let expected = expected.as_bytes();
    let provided = signature.trim().as_bytes();
    expected.len() == provided.len() && bool::from(expected.ct_eq(provided))
}

/// Seconds since the Unix epoch (0 if the clock is before it).
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
