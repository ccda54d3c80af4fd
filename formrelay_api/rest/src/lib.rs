use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::Router;
use formrelay_core_contact_contracts::ContactService;
use formrelay_shared_contracts::rate_limit::RateLimitService;
use tokio::net::TcpListener;

pub use crate::middlewares::cors::{AllowedOrigins, InvalidOriginPattern};

mod errors;
mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Contact, RateLimit> {
    contact: Contact,
    rate_limit: RateLimit,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    pub allowed_origins: Arc<AllowedOrigins>,
}

#[derive(Debug)]
pub struct RestServerRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Contact, RateLimit> RestServer<Contact, RateLimit>
where
    Contact: ContactService,
    RateLimit: RateLimitService,
{
    pub fn new(contact: Contact, rate_limit: RateLimit, config: RestServerConfig) -> Self {
        Self {
            contact,
            rate_limit,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind((self.config.host, self.config.port)).await?;
        let router = self.router();
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    /// Builds the router with all routes and middlewares. Requests must carry
    /// the peer address as `ConnectInfo<SocketAddr>`.
    pub fn router(self) -> Router<()> {
        let RestServerConfig {
            real_ip_config,
            allowed_origins,
            ..
        } = self.config;

        let router = Router::new()
            .merge(routes::health::router())
            .merge(routes::contact::router(
                self.contact.into(),
                self.rate_limit.into(),
            ))
            .fallback(routes::not_found);

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::cors::add(router, allowed_origins);
        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(real_ip_config)(router);
        middlewares::request_id::add(router)
    }
}
