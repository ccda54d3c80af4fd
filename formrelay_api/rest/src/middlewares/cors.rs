//! Cross origin resource sharing for browser clients

use std::{str::FromStr, sync::Arc};

use axum::{
    http::{header::CONTENT_TYPE, request::Parts, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub fn add<S: Clone + Send + Sync + 'static>(
    router: Router<S>,
    allowed_origins: Arc<AllowedOrigins>,
) -> Router<S> {
    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
        origin
            .to_str()
            .is_ok_and(|origin| allowed_origins.is_allowed(origin))
    });

    router.layer(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]),
    )
}

/// The set of origins browsers may send requests from.
///
/// Every entry is either an exact origin (`http://localhost:3000`) or a host
/// wildcard (`https://*.netlify.app`) matching any subdomain of the given host
/// with the given scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<OriginPattern>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginPattern {
    Exact(String),
    Subdomain { scheme: String, suffix: String },
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid origin pattern {0:?}, expected scheme://host or scheme://*.host")]
pub struct InvalidOriginPattern(pub String);

impl AllowedOrigins {
    pub fn new<T: AsRef<str>>(
        patterns: impl IntoIterator<Item = T>,
    ) -> Result<Self, InvalidOriginPattern> {
        patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().parse())
            .collect::<Result<_, _>>()
            .map(Self)
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.0.iter().any(|pattern| pattern.matches(origin))
    }
}

impl OriginPattern {
    fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Exact(exact) => exact.eq_ignore_ascii_case(origin),
            Self::Subdomain { scheme, suffix } => origin
                .split_once("://")
                .filter(|(s, _)| s.eq_ignore_ascii_case(scheme))
                .map(|(_, host)| host.to_ascii_lowercase())
                .is_some_and(|host| {
                    host.strip_suffix(suffix.as_str()).is_some_and(|label| {
                        !label.is_empty()
                            && !label.starts_with('.')
                            && !label.ends_with('.')
                            && label
                                .chars()
                                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
                    })
                }),
        }
    }
}

impl FromStr for OriginPattern {
    type Err = InvalidOriginPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pattern = s.trim().trim_end_matches('/');
        let invalid = || InvalidOriginPattern(s.into());

        let (scheme, host) = pattern.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty()
            || host.is_empty()
            || host.contains('/')
            || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
        {
            return Err(invalid());
        }

        match host.strip_prefix("*.") {
            Some(rest) if !rest.is_empty() && !rest.contains('*') => Ok(Self::Subdomain {
                scheme: scheme.to_ascii_lowercase(),
                suffix: format!(".{}", rest.to_ascii_lowercase()),
            }),
            Some(_) => Err(invalid()),
            None if host.contains('*') => Err(invalid()),
            None => Ok(Self::Exact(pattern.into())),
        }
    }
}

impl FromStr for AllowedOrigins {
    type Err = InvalidOriginPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(',').filter(|pattern| !pattern.trim().is_empty()))
    }
}
