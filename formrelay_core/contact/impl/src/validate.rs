use formrelay_core_contact_contracts::ContactValidationError;
use formrelay_models::contact::{
    ContactEmail, ContactMessage, ContactMessageContent, ContactName, ContactSubmission,
};

/// Sanitizes and checks the fields of a submission in order: name, email,
/// message. The first invalid field is reported.
pub fn validate(submission: ContactSubmission) -> Result<ContactMessage, ContactValidationError> {
    let name =
        ContactName::try_new(submission.name).map_err(|_| ContactValidationError::Name)?;

    let email = ContactEmail::try_new(submission.email)
        .ok()
        .and_then(|email| email.to_email_address())
        .ok_or(ContactValidationError::Email)?;

    let content = ContactMessageContent::try_new(submission.message)
        .map_err(|_| ContactValidationError::Message)?;

    Ok(ContactMessage {
        name,
        email,
        content,
    })
}
