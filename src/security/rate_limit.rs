//! Token-bucket rate limiting keyed by client and route sensitivity.

use std::time::{Duration, Instant};

use axum::http::Method;
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::response::GatewayError;
use crate::observability::metrics;

/// Buckets idle for longer than this are pruned.
const IDLE_EVICTION: Duration = Duration::from_secs(300);
/// Pruning runs once the map holds this many buckets.
const PRUNE_THRESHOLD: usize = 10_000;

/// How sensitive a request is: reads are cheap, writes change upstream state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensitivity {
    Read,
    Write,
}

impl Sensitivity {
    pub fn of(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD => Sensitivity::Read,
            _ => Sensitivity::Write,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Read => "read",
            Sensitivity::Write => "write",
        }
    }
}

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    /// Take one token, or report how long until one is available.
    fn try_acquire(
        &mut self,
        capacity: f64,
        refill_rate: f64,
        now: Instant,
    ) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / refill_rate))
        }
    }
}

/// Per-client limiter with separate read and write budgets.
pub struct RateLimiter {
    buckets: DashMap<(String, Sensitivity), TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    /// (refill per second, burst) for a class. Both are at least 1, so a
    /// zero in unvalidated config can never stall a bucket forever.
    fn limits(&self, class: Sensitivity) -> (f64, f64) {
        let (rate, burst) = match class {
            Sensitivity::Read => (self.config.read_per_second, self.config.read_burst),
            Sensitivity::Write => (self.config.write_per_second, self.config.write_burst),
        };
        (f64::from(rate.max(1)), f64::from(burst.max(1)))
    }

    /// Admit or reject one request from `client`.
    pub fn check(&self, client: &str, method: &Method) -> Result<(), GatewayError> {
        self.check_at(client, Sensitivity::of(method), Instant::now())
    }

    fn check_at(&self, client: &str, class: Sensitivity, now: Instant) -> Result<(), GatewayError> {
        let (rps, burst) = self.limits(class);

        if self.buckets.len() >= PRUNE_THRESHOLD {
            self.prune(now);
        }

        let outcome = self
            .buckets
            .entry((client.to_string(), class))
            .or_insert_with(|| TokenBucket::new(burst, now))
            .try_acquire(burst, rps, now);

        outcome.map_err(|wait| {
            tracing::warn!(client = %client, class = class.as_str(), "Rate limit exceeded");
            metrics::record_rate_limited(class.as_str());
            GatewayError::RateLimited {
                retry_after_secs: wait.as_secs_f64().ceil().max(1.0) as u64,
            }
        })
    }

    fn prune(&self, now: Instant) {
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_update) < IDLE_EVICTION);
    }

    /// Number of tracked buckets.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            read_per_second: 10,
            read_burst: 3,
            write_per_second: 1,
            write_burst: 1,
        })
    }

    #[test]
    fn test_zero_rates_do_not_panic() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: true,
            read_per_second: 0,
            read_burst: 0,
            write_per_second: 0,
            write_burst: 0,
        });
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.9", Sensitivity::Read, now).is_ok());
        match limiter.check_at("10.0.0.9", Sensitivity::Read, now) {
            Err(GatewayError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 1),
            other => panic!("expected rate limit, got {:?}", other),
        }
        assert!(limiter
            .check_at("10.0.0.9", Sensitivity::Read, now + Duration::from_secs(1))
            .is_ok());
    }

    #[test]
    fn test_sensitivity() {
        assert_eq!(Sensitivity::of(&Method::GET), Sensitivity::Read);
        assert_eq!(Sensitivity::of(&Method::HEAD), Sensitivity::Read);
        assert_eq!(Sensitivity::of(&Method::POST), Sensitivity::Write);
        assert_eq!(Sensitivity::of(&Method::DELETE), Sensitivity::Write);
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("10.0.0.1", Sensitivity::Read, now).is_ok());
        }
        let err = limiter.check_at("10.0.0.1", Sensitivity::Read, now).unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited { retry_after_secs: 1 }));
    }

    #[test]
    fn test_refill() {
        let limiter = limiter();
        let now = Instant::now();
        assert!(limiter.check_at("c", Sensitivity::Write, now).is_ok());
        assert!(limiter.check_at("c", Sensitivity::Write, now).is_err());
        assert!(limiter
            .check_at("c", Sensitivity::Write, now + Duration::from_millis(1100))
            .is_ok());
    }

    #[test]
    fn test_classes_and_clients_are_independent() {
        let limiter = limiter();
        let now = Instant::now();
        assert!(limiter.check_at("a", Sensitivity::Write, now).is_ok());
        assert!(limiter.check_at("a", Sensitivity::Write, now).is_err());
        assert!(limiter.check_at("a", Sensitivity::Read, now).is_ok());
        assert!(limiter.check_at("b", Sensitivity::Write, now).is_ok());
        assert_eq!(limiter.tracked(), 3);
    }

    #[test]
    fn test_prune_drops_idle_buckets() {
        let limiter = limiter();
        let now = Instant::now();
        limiter.check_at("old", Sensitivity::Read, now).unwrap();
        limiter.prune(now + IDLE_EVICTION + Duration::from_secs(1));
        assert_eq!(limiter.tracked(), 0);
    }
}
