//! Request cooldown and daily quota accounting
//!
//! The limiter is plain state owned by the client that uses it. It never
//! sleeps itself: callers ask how long to wait, wait however they see fit,
//! then mark the request as issued.

use super::config::QUOTA_WINDOW;
use std::time::Duration;
use tokio::time::Instant;

/// Cooldown-based rate limiter with an optional daily request quota
#[derive(Debug, Clone)]
pub struct CooldownLimiter {
    cooldown: Duration,
    last_request: Option<Instant>,
    quota: Option<DailyQuota>,
}

#[derive(Debug, Clone)]
struct DailyQuota {
    limit: u32,
    used: u32,
    window_start: Option<Instant>,
}

impl CooldownLimiter {
    /// Create a limiter enforcing `cooldown` between requests and no quota
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_request: None,
            quota: None,
        }
    }

    /// Also enforce at most `limit` requests per rolling 24 hours
    pub fn with_daily_quota(mut self, limit: u32) -> Self {
        self.quota = Some(DailyQuota {
            limit,
            used: 0,
            window_start: None,
        });
        self
    }

    /// Minimum delay between two requests
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Enforced daily quota, if any
    pub fn daily_quota(&self) -> Option<u32> {
        self.quota.as_ref().map(|q| q.limit)
    }

    /// Requests counted against the current quota window
    pub fn requests_in_window(&self) -> u32 {
        self.quota.as_ref().map_or(0, |q| q.used)
    }

    /// How long a request issued at `now` must still wait
    pub fn remaining_wait(&self, now: Instant) -> Duration {
        match self.last_request {
            Some(last) => self
                .cooldown
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Check that a request may be issued at `now` without exceeding the quota
    ///
    /// Starts a fresh window once the previous one has fully elapsed.
    pub fn check_quota(&mut self, now: Instant) -> Result<(), RateLimitError> {
        let Some(quota) = self.quota.as_mut() else {
            return Ok(());
        };

        if let Some(start) = quota.window_start {
            if now.saturating_duration_since(start) >= QUOTA_WINDOW {
                quota.used = 0;
                quota.window_start = None;
            }
        }

        if quota.used >= quota.limit {
            let resets_in = quota
                .window_start
                .map_or(Duration::ZERO, |start| {
                    QUOTA_WINDOW.saturating_sub(now.saturating_duration_since(start))
                });
            return Err(RateLimitError::QuotaExhausted {
                limit: quota.limit,
                resets_in,
            });
        }

        Ok(())
    }

    /// Record that a request is being issued at `now`
    pub fn mark_request(&mut self, now: Instant) {
        self.last_request = Some(now);
        if let Some(quota) = self.quota.as_mut() {
            quota.window_start.get_or_insert(now);
            quota.used += 1;
        }
    }
}

/// Rate limiter errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Daily request quota used up
    #[error("daily quota of {limit} requests exhausted; resets in {}s", resets_in.as_secs())]
    QuotaExhausted {
        /// Quota size
        limit: u32,
        /// Time until the quota window restarts
        resets_in: Duration,
    },
}
