use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Response,
    routing, Extension, Router,
};
use formrelay_core_contact_contracts::{
    ContactSendMessageError, ContactService, ContactValidationError,
};
use formrelay_models::contact::ContactRequestMetadata;
use formrelay_shared_contracts::rate_limit::RateLimitService;

use crate::{
    errors::{
        error, internal_server_error, ok, CONTACT_NOT_CONFIGURED, COULD_NOT_SEND_MESSAGE,
        INVALID_EMAIL, INVALID_MESSAGE, INVALID_NAME,
    },
    extractors::{contact_form::ContactForm, user_agent::UserAgent},
    middlewares::{client_ip::ClientIp, rate_limit},
};

/// Maximum accepted size of a contact form body in bytes.
pub const MAX_BODY_SIZE: usize = 50 * 1024;

pub fn router(
    service: Arc<impl ContactService>,
    rate_limit: Arc<impl RateLimitService>,
) -> Router<()> {
    let router = Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(service);

    rate_limit::add(router, rate_limit).layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    Extension(client_ip): Extension<ClientIp>,
    UserAgent(user_agent): UserAgent,
    ContactForm(message): ContactForm,
) -> Response {
    let metadata = ContactRequestMetadata {
        client_ip: Some(client_ip.0),
        user_agent,
    };

    match service.send_message(message.into(), metadata).await {
        Ok(()) => ok(),
        Err(ContactSendMessageError::Invalid(err)) => {
            error(StatusCode::BAD_REQUEST, validation_error_detail(err))
        }
        Err(
            ContactSendMessageError::RecipientNotConfigured
            | ContactSendMessageError::TransportNotConfigured,
        ) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, CONTACT_NOT_CONFIGURED)
        }
        Err(ContactSendMessageError::Send) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, COULD_NOT_SEND_MESSAGE)
        }
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}

fn validation_error_detail(err: ContactValidationError) -> &'static str {
    match err {
        ContactValidationError::Name => INVALID_NAME,
        ContactValidationError::Email => INVALID_EMAIL,
        ContactValidationError::Message => INVALID_MESSAGE,
    }
}
