use std::{future::Future, net::IpAddr, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Counts a request from `client` against its current window and decides
    /// whether the request may proceed.
    fn check(&self, client: IpAddr) -> impl Future<Output = RateLimitDecision> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        /// Maximum number of requests per window
        limit: u32,
        /// Requests left in the current window
        remaining: u32,
        /// Time until the current window ends
        reset_in: Duration,
    },
    Limited {
        /// Maximum number of requests per window
        limit: u32,
        /// Time until the client may send requests again
        retry_after: Duration,
    },
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_check(mut self, client: IpAddr, result: RateLimitDecision) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(client))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
