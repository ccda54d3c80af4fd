use chrono::{DateTime, SecondsFormat, Utc};
use formrelay_email_contracts::Email;
use formrelay_models::{
    contact::{ContactMessage, ContactRequestMetadata},
    email_address::EmailAddressWithName,
};
use htmlescape::encode_minimal;

const UNKNOWN: &str = "unknown";

/// Builds the email that forwards `message` to `recipient`.
///
/// The plain text body contains the fields verbatim, the html body escapes
/// every value that originates from the request. Replies go to the sender of
/// the message.
pub fn contact_email(
    recipient: EmailAddressWithName,
    message: &ContactMessage,
    metadata: &ContactRequestMetadata,
    sent_at: DateTime<Utc>,
) -> Email {
    let name = message.name.as_str();
    let email = message.email.as_str();
    let content = message.content.as_str();
    let sent_at = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let client_ip = metadata
        .client_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN.into());
    let user_agent = metadata.user_agent.as_deref().unwrap_or(UNKNOWN);

    let body = format!(
        "New message via the contact form\n\
         \n\
         Name: {name}\n\
         Email: {email}\n\
         \n\
         Message:\n\
         {content}\n\
         \n\
         --\n\
         Sent at: {sent_at}\n\
         IP: {client_ip}\n\
         User-Agent: {user_agent}\n"
    );

    let html_body = format!(
        "<h2>New message via the contact form</h2>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p style=\"white-space: pre-wrap\">{content}</p>\n\
         <hr>\n\
         <p style=\"color: #666; font-size: 12px\">\
         Sent at: {sent_at}<br>\
         IP: {client_ip}<br>\
         User-Agent: {user_agent}\
         </p>\n",
        name = encode_minimal(name),
        email = encode_minimal(email),
        content = encode_minimal(content),
        client_ip = encode_minimal(&client_ip),
        user_agent = encode_minimal(user_agent),
    );

    Email {
        recipient,
        subject: format!("New contact form message from {name}"),
        body,
        html_body: Some(html_body),
        reply_to: Some(message.email.clone().into()),
    }
}
