//! SMS notifiers: a Twilio-compatible REST sender and a log-only fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use shopkeep_core::error::DomainError;
use shopkeep_core::notify::Notifier;

/// Default Twilio API root.
pub const DEFAULT_SMS_BASE_URL: &str = "https://api.twilio.com";

const SMS_TIMEOUT: Duration = Duration::from_secs(15);

/// Credentials and sender for a Twilio-compatible messages API.
#[derive(Clone)]
pub struct SmsCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl std::fmt::Debug for SmsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Sends texts through `POST /2010-04-01/Accounts/{sid}/Messages.json`.
#[derive(Debug, Clone)]
pub struct TwilioSmsNotifier {
    client: Client,
    base_url: String,
    credentials: SmsCredentials,
}

impl TwilioSmsNotifier {
    /// Creates a notifier against `base_url`.
    #[must_use]
    pub fn new(base_url: &str, credentials: SmsCredentials) -> Self {
        let client = Client::builder()
            .timeout(SMS_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioSmsNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), DomainError> {
        let form = [
            ("To", to),
            ("From", self.credentials.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&form[..])
            .send()
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("sms provider: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamUnavailable(format!(
                "sms provider returned {status}: {error_text}"
            )));
        }

        debug!("sms accepted by provider");
        Ok(())
    }
}

/// Notifier used when no SMS provider is configured: logs instead of
/// sending.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn send_sms(&self, _to: &str, body: &str) -> Result<(), DomainError> {
        info!(chars = body.len(), "sms provider not configured, message dropped");
        Ok(())
    }
}
