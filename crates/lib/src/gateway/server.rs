//! Gateway HTTP server (single port).

use crate::channels::{ChatPlatform, InboundSmsEvent, SlackClient, SmsGateway, TwilioClient};
use crate::config::{self, Config};
use crate::gateway::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::relay::{self, ChatRelayOutcome};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// TwiML document with no verbs: acknowledge the SMS without replying to it.
pub const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response />"#;

/// Shared state for the gateway (config and the two provider handles).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub chat: Arc<dyn ChatPlatform>,
    pub sms: Arc<dyn SmsGateway>,
    /// Channel that receives SMS announcements.
    pub announce_channel: String,
    /// When Some, Slack event callbacks must carry a valid signature.
    pub slack_signing_secret: Option<String>,
}

impl GatewayState {
    /// State with injected providers; channel and signing policy come from `config`.
    pub fn new(config: Config, chat: Arc<dyn ChatPlatform>, sms: Arc<dyn SmsGateway>) -> Self {
        let announce_channel = config::resolve_slack_channel(&config);
        let slack_signing_secret = if config.channels.slack.verify_signatures {
            let secret = config::resolve_slack_signing_secret(&config);
            if secret.is_none() {
                log::warn!("slack signature verification enabled but no signing secret configured; skipping verification");
            }
            secret
        } else {
            None
        };
        Self {
            config: Arc::new(config),
            chat,
            sms,
            announce_channel,
            slack_signing_secret,
        }
    }

    /// Announce in `channel` instead of the one resolved from config and environment.
    pub fn with_announce_channel(mut self, channel: impl Into<String>) -> Self {
        self.announce_channel = channel.into();
        self
    }

    /// State backed by the real Slack and Twilio clients.
    pub fn from_config(config: Config) -> Self {
        let slack_token = config::resolve_slack_token(&config);
        if slack_token.is_none() {
            log::warn!("slack bot token not configured; announcements and reply lookups will fail");
        }
        let slack = SlackClient::new(slack_token, config.channels.slack.api_base_url.clone());
        let twilio = TwilioClient::new(
            config::resolve_twilio_account_sid(&config),
            config::resolve_twilio_auth_token(&config),
            config::resolve_twilio_from_number(&config),
            config.channels.twilio.api_base_url.clone(),
        );
        if !twilio.is_configured() {
            log::warn!("twilio credentials or sender number not configured; replies will not be sent");
        }
        Self::new(config, Arc::new(slack), Arc::new(twilio))
    }
}

/// Routes: health, SMS webhook, chat events webhook.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/incoming/twilio", post(twilio_webhook))
        .route("/incoming/slack", post(slack_webhook))
        .with_state(state)
}

pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config);
    log::info!("announcing inbound SMS in {}", state.announce_channel);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Pull `From` and `Body` out of a form-encoded SMS webhook. Missing fields become empty.
fn parse_sms_form(body: &[u8]) -> InboundSmsEvent {
    let mut sms = InboundSmsEvent {
        from: String::new(),
        body: String::new(),
    };
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "From" => sms.from = value.into_owned(),
            "Body" => sms.body = value.into_owned(),
            _ => {}
        }
    }
    sms
}

fn twiml_ack() -> Response {
    ([(header::CONTENT_TYPE, "text/html")], EMPTY_TWIML).into_response()
}

/// POST /incoming/twilio — announce the SMS in the chat channel; always acknowledges.
async fn twilio_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let sms = parse_sms_form(&body);
    if let Err(e) =
        relay::relay_sms_to_chat(state.chat.as_ref(), &state.announce_channel, &sms).await
    {
        log::warn!("SMS from {} not relayed: {}", sms.from, e);
    }
    twiml_ack()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn slack_signature_ok(secret: &str, headers: &HeaderMap, body: &[u8]) -> bool {
    signature::verify_slack_signature(
        secret,
        header_str(headers, TIMESTAMP_HEADER),
        body,
        header_str(headers, SIGNATURE_HEADER),
        signature::unix_now(),
    )
}

/// POST /incoming/slack — echo verification challenges, relay threaded replies as SMS.
/// Always 200; the body is the challenge or empty.
async fn slack_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(ref secret) = state.slack_signing_secret {
        if !slack_signature_ok(secret, &headers, &body) {
            log::warn!("dropping slack event with missing or invalid signature");
            return StatusCode::OK.into_response();
        }
    }
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("slack event is not JSON: {}", e);
            return StatusCode::OK.into_response();
        }
    };
    match relay::relay_chat_event(state.chat.as_ref(), state.sms.as_ref(), &payload).await {
        Ok(ChatRelayOutcome::Challenge(value)) => {
            ([(header::CONTENT_TYPE, "text/plain")], value).into_response()
        }
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            log::warn!("slack reply not relayed: {}", e);
            StatusCode::OK.into_response()
        }
    }
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}
