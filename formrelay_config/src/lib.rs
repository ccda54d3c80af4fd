use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{File, FileFormat};
pub use duration::Duration;
use formrelay_models::email_address::EmailAddressWithName;
use serde::Deserialize;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files, later files override earlier ones.
pub const CONFIG_PATH_ENV: &str = "FORMRELAY_CONFIG";

/// Environment variables that override single config keys.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "http.host"),
    ("PORT", "http.port"),
    ("CONTACT_TO", "contact.recipient"),
    ("MAIL_FROM", "smtp.from"),
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_PORT", "smtp.port"),
    ("SMTP_SECURE", "smtp.secure"),
    ("SMTP_USER", "smtp.username"),
    ("SMTP_PASS", "smtp.password"),
];

/// Comma separated list replacing `cors.allowed_origins`.
const ALLOWED_ORIGIN_ENV: &str = "ALLOWED_ORIGIN";

/// Loads the config files named by [`CONFIG_PATH_ENV`] (or
/// [`DEFAULT_CONFIG_PATH`]) and applies overrides from the process
/// environment.
pub fn load() -> anyhow::Result<Config> {
    let paths = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(paths) => std::env::split_paths(&paths).collect(),
        None => vec![PathBuf::from(DEFAULT_CONFIG_PATH)],
    };
    load_from(&paths, |key| std::env::var(key).ok())
}

pub fn load_from(
    paths: &[impl AsRef<Path>],
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = ENV_OVERRIDES
        .iter()
        .try_fold(builder, |builder, &(var, key)| {
            builder.set_override_option(key, env(var))
        })?;

    let allowed_origins = env(ALLOWED_ORIGIN_ENV).map(|origins| {
        origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    builder
        .set_override_option("cors.allowed_origins", allowed_origins)?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub real_ip: Option<RealIpConfig>,
}

/// Trust a header set by a reverse proxy to carry the client address.
#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    /// Address of the proxy, the header is ignored on requests from anyone else
    pub set_from: IpAddr,
}

#[derive(Deserialize)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<EmailAddressWithName>,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactConfig {
    pub recipient: Option<EmailAddressWithName>,
}

#[derive(Debug, Deserialize)]
pub struct CorsConfig {
    /// Exact origins or host wildcards such as `https://*.netlify.app`
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}
