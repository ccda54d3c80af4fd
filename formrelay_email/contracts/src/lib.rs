use std::future::Future;

use formrelay_models::email_address::EmailAddressWithName;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Hands a single message to the relay. Nothing is retried.
    fn send(&self, email: Email) -> impl Future<Output = Result<(), EmailSendError>> + Send;

    /// Verify the connection to the relay.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Optional html alternative of `body`
    pub html_body: Option<String>,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("The relay rejected the message with code {0}.")]
    Rejected(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<(), EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_ping(mut self, result: anyhow::Result<()>) -> Self {
        self.expect_ping()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
