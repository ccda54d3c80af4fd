use formrelay_config::Config;
use formrelay_email_contracts::EmailService;
use tracing::{error, info, warn};

use crate::{
    email,
    environment::{self, types::RestServer, ConfigProvider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let server = server(&config).await?;
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}

/// Builds the REST server. Incomplete smtp settings are logged and leave the
/// contact route answering with a configuration error.
async fn server(config: &Config) -> anyhow::Result<RestServer> {
    let config_provider = ConfigProvider::new(config)?;

    info!("Connecting to smtp server");
    let email = match email::connect(&config.smtp) {
        Ok(email) => {
            ping_smtp(&email).await;
            Some(email)
        }
        Err(err) => {
            error!("contact messages will be rejected: {err:#}");
            None
        }
    };

    if config.contact.recipient.is_none() {
        warn!("contact.recipient is not configured, contact messages will be rejected");
    }

    Ok(environment::rest_server(config_provider, email))
}

/// Checks the relay connection. An unreachable relay is not fatal, sends fail
/// individually until it is back.
async fn ping_smtp(email: &impl EmailService) -> bool {
    match email.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!("smtp server is not reachable: {err:#}");
            false
        }
    }
}
