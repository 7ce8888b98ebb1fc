use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::config::{MailConfig, SmtpConfig};
use crate::domain::notify::{EmailMessage, MailTransport};
use crate::shared::errors::NotifyError;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);
const SENDER_NAME: &str = "No Reply";

/// Delivers email through an SMTP relay
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(host: &str, smtp: &SmtpConfig, from_email: &str) -> Result<Self, NotifyError> {
        let tls_parameters = TlsParameters::new(host.to_string())?;
        let tls = if smtp.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(smtp.port)
            .tls(tls)
            .timeout(Some(SMTP_TIMEOUT));
        if let (Some(user), Some(password)) = (&smtp.user, &smtp.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let address: Address = from_email.trim().parse()?;
        info!("SMTP relay {}:{} (implicit TLS: {})", host, smtp.port, smtp.secure);
        Ok(Self {
            mailer: builder.build(),
            from: Mailbox::new(Some(SENDER_NAME.to_string()), address),
        })
    }

    /// `None` when no SMTP host is configured
    pub fn maybe_from_config(config: &MailConfig) -> Result<Option<Self>, NotifyError> {
        match config.smtp.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => Self::new(host, &config.smtp, &config.from_email).map(Some),
            _ => Ok(None),
        }
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, NotifyError> {
        let to: Mailbox = message.to.trim().parse()?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;
        Ok(email)
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let email = self.build_message(message)?;
        self.mailer.send(email).await?;
        Ok(())
    }
}
