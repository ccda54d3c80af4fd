#![allow(dead_code, reason = "shared between test binaries")]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header::CONTENT_TYPE, Method, Request, Response},
    Router,
};
use formrelay_api_rest::{AllowedOrigins, RestServer, RestServerConfig};
use formrelay_core_contact_contracts::ContactService;
use formrelay_shared_contracts::rate_limit::RateLimitService;
use formrelay_shared_impl::{
    rate_limit::{RateLimitServiceConfig, RateLimitServiceImpl},
    time::TimeServiceImpl,
};
use tower::ServiceExt;

pub const PEER: &str = "203.0.113.7:49152";

pub fn config() -> RestServerConfig {
    RestServerConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        real_ip_config: None,
        allowed_origins: Arc::new(
            AllowedOrigins::new([
                "https://*.netlify.app",
                "http://localhost:3000",
                "http://localhost:5173",
            ])
            .unwrap(),
        ),
    }
}

pub fn rate_limit() -> RateLimitServiceImpl<TimeServiceImpl> {
    RateLimitServiceImpl::new(
        TimeServiceImpl,
        RateLimitServiceConfig {
            window: Duration::from_secs(600),
            max_requests: 20,
        },
    )
}

pub fn router(contact: impl ContactService, rate_limit: impl RateLimitService) -> Router {
    RestServer::new(contact, rate_limit, config()).router()
}

pub fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

pub fn json_request(body: &str) -> Request<Body> {
    request(Method::POST, "/api/contact")
        .header(CONTENT_TYPE, "application/json")
        .header("User-Agent", "Mozilla/5.0")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub async fn send(router: &Router, mut request: Request<Body>) -> Response<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo::<SocketAddr>(PEER.parse().unwrap()));
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
