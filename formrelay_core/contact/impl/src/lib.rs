use std::sync::Arc;

use formrelay_core_contact_contracts::{ContactSendMessageError, ContactService};
use formrelay_email_contracts::EmailService;
use formrelay_models::{
    contact::{ContactRequestMetadata, ContactSubmission},
    email_address::EmailAddressWithName,
};
use formrelay_shared_contracts::time::TimeService;
use tracing::{error, info};

pub mod format;
pub mod validate;

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email, Time> {
    /// `None` when the relay settings are incomplete
    email: Option<Email>,
    time: Time,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Where contact messages are delivered to
    pub recipient: Option<Arc<EmailAddressWithName>>,
}

impl<Email, Time> ContactServiceImpl<Email, Time> {
    pub fn new(email: Option<Email>, time: Time, config: ContactFeatureConfig) -> Self {
        Self {
            email,
            time,
            config,
        }
    }
}

impl<EmailS, Time> ContactService for ContactServiceImpl<EmailS, Time>
where
    EmailS: EmailService,
    Time: TimeService,
{
    async fn send_message(
        &self,
        submission: ContactSubmission,
        metadata: ContactRequestMetadata,
    ) -> Result<(), ContactSendMessageError> {
        let message = validate::validate(submission)?;

        let Some(recipient) = self.config.recipient.as_deref() else {
            error!("cannot deliver contact message: no recipient address configured");
            return Err(ContactSendMessageError::RecipientNotConfigured);
        };

        let Some(email_service) = &self.email else {
            error!("cannot deliver contact message: smtp transport is not configured");
            return Err(ContactSendMessageError::TransportNotConfigured);
        };

        let email = format::contact_email(recipient.clone(), &message, &metadata, self.time.now());

        if let Err(err) = email_service.send(email).await {
            error!(client_ip = ?metadata.client_ip, "failed to deliver contact message: {err:#}");
            return Err(ContactSendMessageError::Send);
        }

        info!(client_ip = ?metadata.client_ip, "contact message delivered");

        Ok(())
    }
}
