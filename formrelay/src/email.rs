use anyhow::Context;
use formrelay_config::SmtpConfig;
use formrelay_email_impl::{EmailServiceImpl, SmtpSettings};

/// Connect to the SMTP server
pub fn connect(config: &SmtpConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(&settings(config)).context("Failed to connect to SMTP server")
}

fn settings(config: &SmtpConfig) -> SmtpSettings {
    SmtpSettings {
        host: config.host.clone(),
        port: config.port,
        secure: config.secure,
        username: config.username.clone(),
        password: config.password.clone(),
        from: config.from.clone(),
        timeout: config.timeout.map(Into::into),
    }
}
