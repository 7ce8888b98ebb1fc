use async_trait::async_trait;
use tracing::info;

use crate::domain::notify::{EmailMessage, MailTransport};
use crate::shared::errors::NotifyError;

/// Writes emails to the log instead of sending them
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!(to = %message.to, subject = %message.subject, "📧 {}", message.body);
        Ok(())
    }
}
