use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use crate::config::MailConfig;
use crate::domain::notify::{EmailMessage, MailTransport};
use crate::shared::errors::NotifyError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends email through a transactional-mail HTTP API
#[derive(Debug, Clone)]
pub struct HttpMailTransport {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailTransport {
    pub fn new(endpoint: String, api_key: Option<String>, from: String) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            from,
        })
    }

    /// `None` when no relay endpoint is configured
    pub fn maybe_from_config(config: &MailConfig) -> Result<Option<Self>, NotifyError> {
        match &config.api_url {
            Some(url) if !url.trim().is_empty() => Self::new(
                url.trim().to_string(),
                config.api_key.clone().filter(|k| !k.is_empty()),
                config.sender(),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    fn payload<'a>(&'a self, message: &'a EmailMessage) -> RelayPayload<'a> {
        RelayPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    fn name(&self) -> &'static str {
        "http-relay"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.endpoint).json(&self.payload(message));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!("Mail relay returned {}: {}", status, body);
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(api_url: Option<&str>) -> MailConfig {
        MailConfig {
            api_url: api_url.map(str::to_string),
            api_key: Some("secret".to_string()),
            from_email: "alerts@example.com".to_string(),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_disabled_without_endpoint() {
        assert!(HttpMailTransport::maybe_from_config(&mail_config(None)).unwrap().is_none());
        assert!(HttpMailTransport::maybe_from_config(&mail_config(Some("  "))).unwrap().is_none());
    }

    #[test]
    fn test_payload_uses_sender_and_message() {
        let transport = HttpMailTransport::maybe_from_config(&mail_config(Some("https://mail.example.com/send")))
            .unwrap()
            .unwrap();
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            subject: "ethereum Price Alert".to_string(),
            body: "ethereum has reached the target price of $3000".to_string(),
        };

        let json = serde_json::to_value(transport.payload(&message)).unwrap();

        assert_eq!(json["from"], "\"No Reply\" <alerts@example.com>");
        assert_eq!(json["to"], "user@example.com");
        assert_eq!(json["subject"], "ethereum Price Alert");
        assert_eq!(json["text"], "ethereum has reached the target price of $3000");
    }
}
