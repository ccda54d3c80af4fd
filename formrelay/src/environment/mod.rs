use std::sync::Arc;

use anyhow::Context;
use formrelay_api_rest::{AllowedOrigins, RestServerConfig, RestServerRealIpConfig};
use formrelay_config::Config;
use formrelay_core_contact_impl::ContactFeatureConfig;
use formrelay_shared_impl::rate_limit::RateLimitServiceConfig;
use types::{Contact, Email, RateLimit, RestServer, Time};

pub mod types;

/// Service configurations derived from the loaded [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    // API
    pub rest_server_config: RestServerConfig,

    // Shared
    pub rate_limit_service_config: RateLimitServiceConfig,

    // Core
    pub contact_feature_config: ContactFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let allowed_origins = AllowedOrigins::new(&config.cors.allowed_origins)
            .context("Invalid cors.allowed_origins")?;

        let rest_server_config = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
                Arc::new(RestServerRealIpConfig {
                    header: real_ip_config.header.clone(),
                    set_from: real_ip_config.set_from,
                })
            }),
            allowed_origins: allowed_origins.into(),
        };

        // Shared
        let rate_limit_service_config = RateLimitServiceConfig {
            window: config.rate_limit.window.into(),
            max_requests: config.rate_limit.max_requests,
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            recipient: config.contact.recipient.clone().map(Into::into),
        };

        Ok(Self {
            rest_server_config,
            rate_limit_service_config,
            contact_feature_config,
        })
    }
}

/// Wires the services of the REST server together. Without an `email`
/// transport the server still runs but rejects contact messages.
pub fn rest_server(config: ConfigProvider, email: Option<Email>) -> RestServer {
    let time = Time::default();
    let contact = Contact::new(email, time, config.contact_feature_config);
    let rate_limit = RateLimit::new(time, config.rate_limit_service_config);
    RestServer::new(contact, rate_limit, config.rest_server_config)
}
