//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.smsbridge/config.json`) and environment.
//! Secrets are usually supplied through the environment; the file carries ports,
//! the target channel, and API base URL overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider settings (Slack and Twilio).
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook endpoints (default 5001).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; both providers must be able to reach it).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5001
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-provider config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub slack: SlackChannelConfig,

    #[serde(default)]
    pub twilio: TwilioChannelConfig,
}

/// Slack app config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackChannelConfig {
    /// Bot token (xoxb-...). Overridden by SLACK_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Signing secret for inbound request verification. Overridden by SLACK_SIGNING_SECRET env.
    pub signing_secret: Option<String>,
    /// Channel that receives announcements (default "#texts"). Overridden by SLACK_CHANNEL env.
    #[serde(default = "default_slack_channel")]
    pub channel: String,
    /// Web API base URL (default https://slack.com/api).
    pub api_base_url: Option<String>,
    /// When true and a signing secret is set, unsigned or mis-signed event callbacks are dropped.
    #[serde(default)]
    pub verify_signatures: bool,
}

fn default_slack_channel() -> String {
    "#texts".to_string()
}

impl Default for SlackChannelConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            signing_secret: None,
            channel: default_slack_channel(),
            api_base_url: None,
            verify_signatures: false,
        }
    }
}

/// Twilio account config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwilioChannelConfig {
    /// Account SID (AC...). Overridden by TWILIO_ACCOUNT_SID env.
    pub account_sid: Option<String>,
    /// Auth token. Overridden by TWILIO_AUTH_TOKEN env.
    pub auth_token: Option<String>,
    /// Sender number for outbound SMS. Overridden by TWILIO_NUMBER env.
    pub from_number: Option<String>,
    /// REST API base URL (default https://api.twilio.com).
    pub api_base_url: Option<String>,
}

/// Env value if set and non-empty, otherwise the trimmed config value if non-empty.
fn env_or(var: &str, fallback: Option<&String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            fallback
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_slack_token(config: &Config) -> Option<String> {
    env_or("SLACK_BOT_TOKEN", config.channels.slack.bot_token.as_ref())
}

/// Resolve the Slack signing secret: env SLACK_SIGNING_SECRET overrides config.
pub fn resolve_slack_signing_secret(config: &Config) -> Option<String> {
    env_or(
        "SLACK_SIGNING_SECRET",
        config.channels.slack.signing_secret.as_ref(),
    )
}

/// Resolve the announcement channel: env SLACK_CHANNEL overrides config.
pub fn resolve_slack_channel(config: &Config) -> String {
    env_or("SLACK_CHANNEL", Some(&config.channels.slack.channel))
        .unwrap_or_else(default_slack_channel)
}

/// Resolve the Twilio account SID: env TWILIO_ACCOUNT_SID overrides config.
pub fn resolve_twilio_account_sid(config: &Config) -> Option<String> {
    env_or(
        "TWILIO_ACCOUNT_SID",
        config.channels.twilio.account_sid.as_ref(),
    )
}

/// Resolve the Twilio auth token: env TWILIO_AUTH_TOKEN overrides config.
pub fn resolve_twilio_auth_token(config: &Config) -> Option<String> {
    env_or("TWILIO_AUTH_TOKEN", config.channels.twilio.auth_token.as_ref())
}

/// Resolve the outbound SMS sender number: env TWILIO_NUMBER overrides config.
pub fn resolve_twilio_from_number(config: &Config) -> Option<String> {
    env_or("TWILIO_NUMBER", config.channels.twilio.from_number.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SMSBRIDGE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".smsbridge").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default path). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
