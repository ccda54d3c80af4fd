//! Fixed window request counting per client address.

use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use formrelay_shared_contracts::{
    rate_limit::{RateLimitDecision, RateLimitService},
    time::TimeService,
};
use tokio::sync::Mutex;
use tracing::debug;

/// Number of tracked clients above which expired windows are dropped before a
/// new client is added.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl<Time> {
    time: Time,
    config: RateLimitServiceConfig,
    state: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitServiceConfig {
    pub window: Duration,
    pub max_requests: u32,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

impl<Time> RateLimitServiceImpl<Time> {
    pub fn new(time: Time, config: RateLimitServiceConfig) -> Self {
        Self {
            time,
            config,
            state: Default::default(),
        }
    }
}

impl<Time> RateLimitService for RateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    async fn check(&self, client: IpAddr) -> RateLimitDecision {
        let now = self.time.now();
        let window = self.config.window;
        let limit = self.config.max_requests;

        let mut state = self.state.lock().await;

        if !state.contains_key(&client) && state.len() >= PRUNE_THRESHOLD {
            state.retain(|_, w| now < w.started + window);
        }

        let entry = state.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now >= entry.started + window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_in = (entry.started + window - now)
            .to_std()
            .unwrap_or_default();

        if entry.count >= limit {
            debug!(%client, ?reset_in, "rate limit exceeded");
            return RateLimitDecision::Limited {
                limit,
                retry_after: reset_in,
            };
        }

        entry.count += 1;
        RateLimitDecision::Allowed {
            limit,
            remaining: limit - entry.count,
            reset_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use formrelay_shared_contracts::time::MockTimeService;
    use formrelay_utils::assert_matches;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(600);

    fn clock(start: DateTime<Utc>) -> (MockTimeService, Arc<StdMutex<DateTime<Utc>>>) {
        let now = Arc::new(StdMutex::new(start));
        let mut time = MockTimeService::new();
        let handle = Arc::clone(&now);
        time.expect_now().returning(move || *handle.lock().unwrap());
        (time, now)
    }

    fn sut(time: MockTimeService) -> RateLimitServiceImpl<MockTimeService> {
        RateLimitServiceImpl::new(
            time,
            RateLimitServiceConfig {
                window: WINDOW,
                max_requests: 20,
            },
        )
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn twenty_first_request_is_limited() {
        // Arrange
        let (time, _) = clock(start());
        let sut = sut(time);
        let client = IpAddr::from([203, 0, 113, 7]);

        // Act
        let mut decisions = Vec::new();
        for _ in 0..21 {
            decisions.push(sut.check(client).await);
        }

        // Assert
        assert_matches!(
            decisions[0],
            RateLimitDecision::Allowed {
                limit: 20,
                remaining: 19,
                ..
            }
        );
        assert_matches!(
            decisions[19],
            RateLimitDecision::Allowed { remaining: 0, .. }
        );
        assert_matches!(
            decisions[20],
            RateLimitDecision::Limited { retry_after, .. } if *retry_after == WINDOW
        );
    }

    #[tokio::test]
    async fn clients_are_counted_separately() {
        // Arrange
        let (time, _) = clock(start());
        let sut = sut(time);
        let a = IpAddr::from([203, 0, 113, 7]);
        let b = IpAddr::from([198, 51, 100, 1]);

        // Act
        for _ in 0..20 {
            assert_matches!(sut.check(a).await, RateLimitDecision::Allowed { .. });
        }
        let a_result = sut.check(a).await;
        let b_result = sut.check(b).await;

        // Assert
        assert_matches!(a_result, RateLimitDecision::Limited { .. });
        assert_matches!(b_result, RateLimitDecision::Allowed { .. });
    }

    #[tokio::test]
    async fn window_rolls_over() {
        // Arrange
        let (time, now) = clock(start());
        let sut = sut(time);
        let client = IpAddr::from([203, 0, 113, 7]);
        for _ in 0..20 {
            sut.check(client).await;
        }

        // Act
        *now.lock().unwrap() = start() + Duration::from_secs(599);
        let before_rollover = sut.check(client).await;
        *now.lock().unwrap() = start() + WINDOW;
        let after_rollover = sut.check(client).await;

        // Assert
        assert_matches!(
            before_rollover,
            RateLimitDecision::Limited { retry_after, .. } if *retry_after == Duration::from_secs(1)
        );
        assert_matches!(
            after_rollover,
            RateLimitDecision::Allowed { remaining: 19, .. }
        );
    }

    #[tokio::test]
    async fn expired_windows_are_pruned() {
        // Arrange
        let (time, now) = clock(start());
        let sut = sut(time);
        for i in 0..PRUNE_THRESHOLD as u32 {
            sut.check(IpAddr::from(i.to_be_bytes())).await;
        }

        // Act
        *now.lock().unwrap() = start() + WINDOW;
        sut.check(IpAddr::from([10, 255, 255, 255])).await;

        // Assert
        assert_eq!(sut.state.lock().await.len(), 1);
    }
}
