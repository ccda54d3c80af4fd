use clap::Subcommand;
use formrelay_config::Config;
use formrelay_email_contracts::{Email, EmailService};
use formrelay_models::email_address::EmailAddressWithName;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.smtp)?;
    info!(sender = %email_service.sender(), %recipient, "Sending test email");

    email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: "Email deliverability seems to be working!".into(),
            html_body: None,
            reply_to: None,
        })
        .await?;

    Ok(())
}
