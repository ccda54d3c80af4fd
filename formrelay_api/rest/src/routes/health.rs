use axum::{response::Response, routing, Router};

use crate::errors::ok;

pub fn router() -> Router<()> {
    Router::new()
        .route("/", routing::get(index))
        .route("/health", routing::get(health))
}

async fn index() -> &'static str {
    "formrelay is running"
}

async fn health() -> Response {
    ok()
}
