use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
    Form, Json,
};
use tracing::debug;

use crate::{
    errors::{error, BODY_TOO_LARGE, INVALID_BODY},
    models::contact::ApiContactMessage,
};

/// Contact form body, accepted either as JSON or as
/// `application/x-www-form-urlencoded`.
pub struct ContactForm(pub ApiContactMessage);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for ContactForm {
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let result = if is_form_urlencoded(&request) {
            Form::<ApiContactMessage>::from_request(request, state)
                .await
                .map(|Form(message)| message)
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        } else {
            Json::<ApiContactMessage>::from_request(request, state)
                .await
                .map(|Json(message)| message)
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        };

        result.map(Self).map_err(|(status, reason)| {
            debug!(%status, %reason, "rejecting contact form body");
            if status == StatusCode::PAYLOAD_TOO_LARGE {
                error(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE)
            } else {
                error(StatusCode::BAD_REQUEST, INVALID_BODY)
            }
        })
    }
}

fn is_form_urlencoded(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}
