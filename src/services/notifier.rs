//! Outbound notification dispatch
//!
//! `NotificationDispatcher` abstracts a one-shot message delivery. Two
//! implementations exist: Twilio's WhatsApp channel for production and a
//! log-only dispatcher used when notifications are disabled.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::NotificationConfig;

static WHATSAPP_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^whatsapp:\+\d{6,15}$").expect("address pattern is valid"));

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Delivers one message to one address
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotificationError>;
}

/// `whatsapp:+<6..15 digits>`
pub fn is_whatsapp_address(address: &str) -> bool {
    WHATSAPP_ADDRESS.is_match(address)
}

/// Logs instead of sending
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        tracing::info!(to, body, "notification delivery disabled, message logged only");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio Programmable Messaging over the WhatsApp channel
pub struct TwilioWhatsAppNotifier {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioWhatsAppNotifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from: config.whatsapp_from.clone(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl NotificationDispatcher for TwilioWhatsAppNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        if self.from.is_empty() || to.is_empty() {
            return Err(NotificationError::InvalidDestination(
                "sender and recipient must both be set".to_string(),
            ));
        }
        if !is_whatsapp_address(to) {
            return Err(NotificationError::InvalidDestination(to.to_string()));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(format!("{}: {}", status, detail)));
        }

        let message: MessageResource = response
            .json()
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;
        tracing::info!(sid = %message.sid, to, "WhatsApp message sent");

        Ok(())
    }
}

/// Pick the dispatcher the configuration asks for
pub fn build_dispatcher(config: &NotificationConfig) -> Arc<dyn NotificationDispatcher> {
    if config.enabled {
        Arc::new(TwilioWhatsAppNotifier::new(config))
    } else {
        Arc::new(LogDispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: String) -> NotificationConfig {
        NotificationConfig {
            enabled: true,
            api_base,
            twilio_account_sid: "AC123".into(),
            twilio_auth_token: "secret".into(),
            whatsapp_from: "whatsapp:+14155238886".into(),
            admin_whatsapp_number: "whatsapp:+6285700000000".into(),
        }
    }

    #[test]
    fn test_whatsapp_address_format() {
        assert!(is_whatsapp_address("whatsapp:+6285707202183"));
        assert!(!is_whatsapp_address("+6285707202183"));
        assert!(!is_whatsapp_address("whatsapp:+12"));
        assert!(!is_whatsapp_address("whatsapp:+62abc"));
    }

    #[tokio::test]
    async fn test_log_dispatcher_always_succeeds() {
        assert!(LogDispatcher.send("", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_twilio_posts_form_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(basic_auth("AC123", "secret"))
            .and(body_string_contains("To=whatsapp%3A%2B6285700000000"))
            .and(body_string_contains("Body=New+article"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"sid": "SM1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TwilioWhatsAppNotifier::new(&config(server.uri()));
        notifier
            .send("whatsapp:+6285700000000", "New article")
            .await
            .expect("send should succeed");
    }

    #[tokio::test]
    async fn test_twilio_error_status_is_send_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let notifier = TwilioWhatsAppNotifier::new(&config(server.uri()));
        let err = notifier
            .send("whatsapp:+6285700000000", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::SendFailed(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_twilio_rejects_bad_destination_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = TwilioWhatsAppNotifier::new(&config(server.uri()));
        assert!(matches!(
            notifier.send("", "hi").await,
            Err(NotificationError::InvalidDestination(_))
        ));
        assert!(matches!(
            notifier.send("+6285700000000", "hi").await,
            Err(NotificationError::InvalidDestination(_))
        ));

        let mut missing_from = config(server.uri());
        missing_from.whatsapp_from.clear();
        let notifier = TwilioWhatsAppNotifier::new(&missing_from);
        assert!(notifier
            .send("whatsapp:+6285700000000", "hi")
            .await
            .is_err());
    }

    #[test]
    fn test_build_dispatcher_respects_enabled_flag() {
        let disabled = NotificationConfig::default();
        assert!(!disabled.enabled);
        // Only checks that both branches construct
        let _ = build_dispatcher(&disabled);
        let _ = build_dispatcher(&config("http://localhost".into()));
    }
}
