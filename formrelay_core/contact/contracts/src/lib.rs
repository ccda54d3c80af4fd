use std::future::Future;

use formrelay_models::contact::{ContactRequestMetadata, ContactSubmission};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactService: Send + Sync + 'static {
    /// Validates a submission and forwards it to the configured recipient.
    fn send_message(
        &self,
        submission: ContactSubmission,
        metadata: ContactRequestMetadata,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error(transparent)]
    Invalid(#[from] ContactValidationError),
    #[error("No contact recipient has been configured.")]
    RecipientNotConfigured,
    #[error("The smtp transport has not been configured.")]
    TransportNotConfigured,
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The first field of a submission that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("The name must be at least 2 characters long.")]
    Name,
    #[error("The email address is invalid.")]
    Email,
    #[error("The message must be at least 10 characters long.")]
    Message,
}

#[cfg(feature = "mock")]
impl MockContactService {
    pub fn with_send_message(
        mut self,
        submission: ContactSubmission,
        metadata: ContactRequestMetadata,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(
                mockall::predicate::eq(submission),
                mockall::predicate::eq(metadata),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}
