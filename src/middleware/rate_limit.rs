use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota,
    clock::{Clock, DefaultClock},
    middleware::StateInformationMiddleware,
    state::keyed::DefaultKeyedStateStore,
};

use crate::{error::AppError, extract::rate_limit_key};

type KeyedLimiter = governor::RateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// Per client request limiter.
///
/// A client may send `max_requests` requests at once; after that one more
/// request becomes available every `window / max_requests`, so a client that
/// waits the whole window has its full allowance back.
pub struct RateLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    window: Duration,
    period: Duration,
    max_requests: u32,
    trust_proxy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let period = (window / burst.get()).max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: governor::RateLimiter::keyed(quota)
                .with_middleware::<StateInformationMiddleware>(),
            clock: DefaultClock::default(),
            window,
            period,
            max_requests: burst.get(),
            trust_proxy: false,
        }
    }

    /// Key clients on `X-Forwarded-For`/`X-Real-IP` instead of the socket peer.
    pub fn trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn trusts_proxy(&self) -> bool {
        self.trust_proxy
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, key: &str) -> Decision {
        self.limiter.retain_recent();

        match self.limiter.check_key(&key.to_owned()) {
            Ok(snapshot) => {
                let remaining = snapshot.remaining_burst_capacity().min(self.max_requests);
                Decision::Allowed {
                    remaining,
                    reset: self.period * (self.max_requests - remaining),
                }
            }
            Err(not_until) => Decision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    /// Window length as shown to clients, e.g. `15 minutes`.
    pub fn window_text(&self) -> String {
        let secs = self.window.as_secs();
        match secs {
            s if s >= 60 && s % 60 == 0 => plural(s / 60, "minute"),
            s => plural(s, "second"),
        }
    }

    /// Clients whose allowance is not yet fully restored.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.len()
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Middleware applying the limiter to every request of the wrapped routes.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = rate_limit_key(req.headers(), req.extensions(), limiter.trusts_proxy())
        .map(|ip: IpAddr| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&key) {
        Decision::Allowed { remaining, reset } => {
            let mut response = next.run(req).await;
            set_rate_limit_headers(response.headers_mut(), limiter.max_requests(), remaining, reset);
            response
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");

            let mut response = AppError::RateLimited {
                retry_after: limiter.window_text(),
            }
            .into_response();

            let headers = response.headers_mut();
            set_rate_limit_headers(headers, limiter.max_requests(), 0, retry_after);
            headers.insert(header::RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after)));
            response
        }
    }
}

fn set_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: Duration) {
    headers.insert("ratelimit-limit", HeaderValue::from(limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(ceil_secs(reset)));
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_after_max_requests() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 5);

        for _ in 0..5 {
            assert!(matches!(
                limiter.check("203.0.113.1"),
                Decision::Allowed { .. }
            ));
        }

        match limiter.check("203.0.113.1") {
            Decision::Limited { retry_after } => {
                assert!(retry_after > Duration::from_secs(170));
                assert!(retry_after <= Duration::from_secs(180));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            limiter.check("203.0.113.2"),
            Decision::Allowed { .. }
        ));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 3);

        let remaining: Vec<u32> = (0..3)
            .map(|_| match limiter.check("a") {
                Decision::Allowed { remaining, .. } => remaining,
                other => panic!("unexpected {other:?}"),
            })
            .collect();

        assert!(remaining.windows(2).all(|pair| pair[1] < pair[0]));
        assert!(remaining[0] < 3);
    }

    // Unlike a fixed window, the allowance comes back one request per
    // `window / max_requests` instead of all at once when the window ends.
    #[tokio::test]
    async fn test_allowance_returns_gradually() {
        let limiter = RateLimiter::new(Duration::from_millis(400), 2);

        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("a"), Decision::Limited { .. }));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("a"), Decision::Limited { .. }));

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
    }

    #[tokio::test]
    async fn test_idle_clients_are_pruned() {
        let limiter = RateLimiter::new(Duration::from_millis(200), 2);

        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.tracked_clients(), 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_window_text() {
        assert_eq!(RateLimiter::new(Duration::from_secs(900), 5).window_text(), "15 minutes");
        assert_eq!(RateLimiter::new(Duration::from_secs(60), 5).window_text(), "1 minute");
        assert_eq!(RateLimiter::new(Duration::from_secs(90), 5).window_text(), "90 seconds");
    }
}
