use std::time::Duration;

use anyhow::{anyhow, Context};
use formrelay_email_contracts::{Email, EmailSendError, EmailService};
use formrelay_models::email_address::EmailAddressWithName;
use formrelay_utils::Apply;
use lettre::{
    message::{header, MessageBuilder, MultiPart},
    transport::smtp::{
        self,
        authentication::Credentials,
        client::{Tls, TlsParameters},
        response::{Code, Severity},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Connection settings of the outbound relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    /// Use implicit TLS instead of opportunistic STARTTLS
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender of all messages, defaults to `username`
    pub from: Option<EmailAddressWithName>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum EmailConfigError {
    #[error("No smtp host has been configured.")]
    MissingHost,
    #[error("No smtp username and password have been configured.")]
    MissingCredentials,
    #[error("No sender address has been configured and the smtp username {0:?} is not a valid email address.")]
    InvalidSender(String),
    #[error("Failed to set up the smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl EmailServiceImpl {
    /// Builds the relay transport. A working transport spawns its connection
    /// pool on the current Tokio runtime.
    pub fn new(settings: &SmtpSettings) -> Result<Self, EmailConfigError> {
        let host = non_empty(settings.host.as_deref()).ok_or(EmailConfigError::MissingHost)?;

        let (Some(username), Some(password)) = (
            non_empty(settings.username.as_deref()),
            non_empty(settings.password.as_deref()),
        ) else {
            return Err(EmailConfigError::MissingCredentials);
        };

        let from = match &settings.from {
            Some(from) => from.clone(),
            None => username
                .parse()
                .map_err(|_| EmailConfigError::InvalidSender(username.into()))?,
        };

        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Opportunistic(TlsParameters::new(host.into())?))
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(username.into(), password.into()))
            .timeout(settings.timeout)
            .build();

        debug!(host, port = settings.port, secure = settings.secure, %from, "smtp transport ready");

        Ok(Self { from, transport })
    }

    pub fn sender(&self) -> &EmailAddressWithName {
        &self.from
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject);

        let message = match email.html_body {
            Some(html_body) => {
                builder.multipart(MultiPart::alternative_plain_html(email.body, html_body))?
            }
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.body)?,
        };

        Ok(message)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> Result<(), EmailSendError> {
        let message = self
            .build_message(email)
            .context("Failed to build email message")?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(send_error)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

/// Negative relay replies become [`EmailSendError::Rejected`], everything else
/// (connection, tls, protocol) is passed on as is.
fn send_error(err: smtp::Error) -> EmailSendError {
    match rejection_code(err.status()) {
        Some(code) => {
            debug!("smtp relay rejected message: {err}");
            EmailSendError::Rejected(code)
        }
        None => EmailSendError::Other(
            anyhow::Error::new(err).context("Failed to send email via smtp relay"),
        ),
    }
}

fn rejection_code(status: Option<Code>) -> Option<String> {
    status
        .filter(|code| {
            matches!(
                code.severity,
                Severity::TransientNegativeCompletion | Severity::PermanentNegativeCompletion
            )
        })
        .map(|code| code.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|x| !x.is_empty())
}
