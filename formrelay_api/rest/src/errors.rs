use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error.";
pub const NOT_FOUND: &str = "Not found.";
pub const INVALID_BODY: &str = "Invalid request body.";
pub const BODY_TOO_LARGE: &str = "Request body too large.";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";

// Contact
pub const INVALID_NAME: &str = "Please provide your name (at least 2 characters).";
pub const INVALID_EMAIL: &str = "Please provide a valid email address.";
pub const INVALID_MESSAGE: &str = "Please provide a message (at least 10 characters).";
pub const CONTACT_NOT_CONFIGURED: &str = "Contact form is not configured.";
pub const COULD_NOT_SEND_MESSAGE: &str = "Failed to send message. Please try again later.";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn error(code: StatusCode, error: &'static str) -> Response {
    (code, Json(ApiError { ok: false, error })).into_response()
}

pub fn ok() -> Response {
    Json(ApiOk { ok: true }).into_response()
}

#[derive(Serialize)]
pub struct ApiError {
    pub ok: bool,
    pub error: &'static str,
}

#[derive(Serialize)]
pub struct ApiOk {
    pub ok: bool,
}
