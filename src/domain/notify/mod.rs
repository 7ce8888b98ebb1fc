//! Notification domain - best-effort email delivery

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::shared::errors::NotifyError;

/// Outbound email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A way of getting an email to its recipient
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Fans a message out to every configured transport.
///
/// Delivery is fire-and-forget: failures are logged and never reach the
/// caller, so they cannot affect stored samples or alert state.
pub struct Notifier {
    transports: Vec<Arc<dyn MailTransport>>,
}

impl Notifier {
    pub fn new(transports: Vec<Arc<dyn MailTransport>>) -> Self {
        Self { transports }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) {
        let message = EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        for transport in &self.transports {
            match transport.deliver(&message).await {
                Ok(()) => info!("Email sent successfully to {} via {}", to, transport.name()),
                Err(e) => warn!("Failed to send email to {} via {}: {}", to, transport.name(), e),
            }
        }
    }
}
