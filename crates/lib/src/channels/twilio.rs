//! Twilio SMS: Messages resource of the REST API, basic auth with the account SID and token.

use crate::channels::handle::{ChannelError, SmsGateway};
use async_trait::async_trait;
use serde::Deserialize;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// Sends SMS from a fixed number on one account.
pub struct TwilioClient {
    api_base: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    client: reqwest::Client,
}

impl TwilioClient {
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| TWILIO_API_BASE.to_string());
        Self {
            api_base,
            account_sid,
            auth_token,
            from_number,
            client: reqwest::Client::new(),
        }
    }

    /// True when SID, token, and sender number are all present.
    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        )
    }

    /// POST Messages.json with To, From, Body.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<(), ChannelError> {
        let sid = self
            .account_sid
            .as_deref()
            .ok_or(ChannelError::NotConfigured("twilio account sid"))?;
        let token = self
            .auth_token
            .as_deref()
            .ok_or(ChannelError::NotConfigured("twilio auth token"))?;
        let from = self
            .from_number
            .as_deref()
            .ok_or(ChannelError::NotConfigured("twilio sender number"))?;
        let res = self
            .client
            .post(self.messages_url(sid))
            .basic_auth(sid, Some(token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TwilioErrorResponse>(&text) {
                Ok(TwilioErrorResponse {
                    code,
                    message: Some(message),
                }) => match code {
                    Some(code) => format!("{} (code {})", message, code),
                    None => message,
                },
                _ => text,
            };
            return Err(ChannelError::Api(format!(
                "sending SMS failed: {} {}",
                status, detail
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for TwilioClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), ChannelError> {
        self.send_message(to, body).await
    }
}
