//! Per client request quota for a group of routes

use std::{net::Ipv4Addr, sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use formrelay_shared_contracts::rate_limit::{RateLimitDecision, RateLimitService};
use tracing::debug;

use super::client_ip::ClientIp;
use crate::errors::{error, TOO_MANY_REQUESTS};

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Counts every request to the routes of `router` against the quota of its
/// client address.
pub fn add<S, R>(router: Router<S>, rate_limit: Arc<R>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    R: RateLimitService,
{
    router.route_layer(from_fn_with_state(rate_limit, middleware::<R>))
}

async fn middleware<R: RateLimitService>(
    State(rate_limit): State<Arc<R>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = request
        .extensions()
        .get::<ClientIp>()
        .map_or(Ipv4Addr::UNSPECIFIED.into(), |ip| ip.0);

    match rate_limit.check(client_ip).await {
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_in,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT, limit.into());
            headers.insert(RATE_LIMIT_REMAINING, remaining.into());
            headers.insert(RATE_LIMIT_RESET, ceil_secs(reset_in).into());
            response
        }
        RateLimitDecision::Limited { limit, retry_after } => {
            debug!(%client_ip, ?retry_after, "rejecting rate limited request");
            let seconds = HeaderValue::from(ceil_secs(retry_after));
            let mut response = error(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS);
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT, limit.into());
            headers.insert(RATE_LIMIT_REMAINING, 0u32.into());
            headers.insert(RATE_LIMIT_RESET, seconds.clone());
            headers.insert(axum::http::header::RETRY_AFTER, seconds);
            response
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
