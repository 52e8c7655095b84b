// Per-user command rate limiting

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Commands allowed per user within one window
pub const DEFAULT_MAX_CALLS: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Sliding-window limiter keyed by user id
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: DashMap<u64, VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: DashMap::new(),
        }
    }

    /// Records a call, or returns how long the user has to wait
    pub fn check(&self, user_id: u64) -> Result<(), Duration> {
        self.check_at(user_id, Instant::now())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Forgets users with no call inside the window
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&self, now: Instant) {
        self.calls.retain(|_, calls| {
            calls
                .back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }

    fn check_at(&self, user_id: u64, now: Instant) -> Result<(), Duration> {
        let mut calls = self.calls.entry(user_id).or_default();
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }

        if calls.len() >= self.max_calls {
            let oldest = calls.front().copied().unwrap_or(now);
            return Err(self.window.saturating_sub(now.duration_since(oldest)));
        }
        calls.push_back(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_and_recover() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).is_ok());
        assert!(limiter.check_at(1, start + Duration::from_secs(1)).is_ok());

        let wait = limiter
            .check_at(1, start + Duration::from_secs(4))
            .unwrap_err();
        assert_eq!(wait, Duration::from_secs(6));

        // Other users are unaffected
        assert!(limiter.check_at(2, start + Duration::from_secs(4)).is_ok());

        assert!(limiter.check_at(1, start + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_rejected_calls_are_not_counted() {
        let limiter = RateLimiter::new(1, Duration::from_secs(5));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).is_ok());
        assert!(limiter.check_at(1, start + Duration::from_secs(1)).is_err());
        assert!(limiter.check_at(1, start + Duration::from_secs(2)).is_err());
        assert!(limiter.check_at(1, start + Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_prune_drops_idle_users() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).is_ok());
        assert!(limiter.check_at(2, start + Duration::from_secs(8)).is_ok());

        limiter.prune_at(start + Duration::from_secs(12));
        assert!(!limiter.calls.contains_key(&1));
        assert!(limiter.calls.contains_key(&2));

        // The kept user's history still counts
        assert!(limiter.check_at(2, start + Duration::from_secs(12)).is_ok());
        assert!(limiter.check_at(2, start + Duration::from_secs(13)).is_err());

        limiter.prune_at(start + Duration::from_secs(30));
        assert!(limiter.calls.is_empty());
    }
}
