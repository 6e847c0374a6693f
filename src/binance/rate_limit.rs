// =============================================================================
// Rate-Limit Tracker — request-weight budget per rolling window
// =============================================================================
//
// Binance charges every REST call a "weight" and allows 1200 per minute. We
// keep our own, lower, configurable budget: a request that would push the
// current window past it is refused up front, and the caller turns that
// refusal into a per-symbol failure instead of risking a 429 / IP ban.
//
// The counter is also refreshed from the `X-MBX-USED-WEIGHT-1M` response
// header, which accounts for weight spent by other processes on the same IP.
// =============================================================================

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

/// Fraction of the budget at which we start warning.
const WARN_RATIO: f64 = 0.8;

/// Thread-safe request-weight tracker.
pub struct RateLimitTracker {
    used_weight: AtomicU32,
    weight_limit: u32,
    window: Duration,
    window_started: Mutex<Instant>,
}

/// Immutable snapshot of the current budget (served by the health endpoint).
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitSnapshot {
    pub used_weight: u32,
    pub weight_limit: u32,
    pub window_secs: u64,
}

impl RateLimitTracker {
    pub fn new(weight_limit: u32, window: Duration) -> Self {
        Self {
            used_weight: AtomicU32::new(0),
            weight_limit,
            window,
            window_started: Mutex::new(Instant::now()),
        }
    }

    /// One-minute window, matching Binance's own accounting.
    pub fn per_minute(weight_limit: u32) -> Self {
        Self::new(weight_limit, Duration::from_secs(60))
    }

    /// Reset the counter once the current window has elapsed.
    fn roll_window(&self) {
        let mut started = self.window_started.lock();
        if started.elapsed() >= self.window {
            *started = Instant::now();
            self.used_weight.store(0, Ordering::Relaxed);
            debug!("rate-limit window rolled over");
        }
    }

    // -------------------------------------------------------------------------
    // Pre-flight
    // -------------------------------------------------------------------------

    /// Reserve `weight` from the budget. Returns `false` (and reserves
    /// nothing) when the request would exceed it.
    pub fn try_acquire(&self, weight: u32) -> bool {
        self.roll_window();

        let reserved = self
            .used_weight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                let next = current.saturating_add(weight);
                (next <= self.weight_limit).then_some(next)
            });

        match reserved {
            Ok(prev) => {
                let now = prev + weight;
                if f64::from(now) >= f64::from(self.weight_limit) * WARN_RATIO {
                    warn!(
                        used_weight = now,
                        limit = self.weight_limit,
                        "rate-limit weight above warning threshold"
                    );
                }
                true
            }
            Err(current) => {
                warn!(
                    current_weight = current,
                    requested_weight = weight,
                    limit = self.weight_limit,
                    "request blocked: would exceed rate-limit budget"
                );
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Header-based updates
    // -------------------------------------------------------------------------

    /// Adopt the server's view of used weight when it is higher than ours.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let Some(server_weight) = headers
            .get("X-MBX-USED-WEIGHT-1M")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
        else {
            return;
        };

        let prev = self.used_weight.fetch_max(server_weight, Ordering::Relaxed);
        debug!(server_weight, local_weight = prev, "rate-limit weight updated from header");
    }

    // -------------------------------------------------------------------------
    // Snapshot
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.roll_window();
        RateLimitSnapshot {
            used_weight: self.used_weight.load(Ordering::Relaxed),
            weight_limit: self.weight_limit,
            window_secs: self.window.as_secs(),
        }
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("used_weight", &self.used_weight.load(Ordering::Relaxed))
            .field("weight_limit", &self.weight_limit)
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn acquire_until_budget_exhausted() {
        let tracker = RateLimitTracker::per_minute(10);
        assert!(tracker.try_acquire(4));
        assert!(tracker.try_acquire(4));
        assert!(!tracker.try_acquire(4));
        assert!(tracker.try_acquire(2));
        assert!(!tracker.try_acquire(1));
        assert_eq!(tracker.snapshot().used_weight, 10);
    }

    #[test]
    fn refused_request_reserves_nothing() {
        let tracker = RateLimitTracker::per_minute(5);
        assert!(!tracker.try_acquire(6));
        assert_eq!(tracker.snapshot().used_weight, 0);
    }

    #[test]
    fn window_rollover_resets_budget() {
        let tracker = RateLimitTracker::new(3, Duration::ZERO);
        assert!(tracker.try_acquire(3));
        // Zero-length window: every call starts a fresh one.
        assert!(tracker.try_acquire(3));
    }

    #[test]
    fn header_raises_used_weight() {
        let tracker = RateLimitTracker::per_minute(1000);
        assert!(tracker.try_acquire(10));

        let mut headers = HeaderMap::new();
        headers.insert("X-MBX-USED-WEIGHT-1M", HeaderValue::from_static("995"));
        tracker.update_from_headers(&headers);
        assert_eq!(tracker.snapshot().used_weight, 995);
        assert!(!tracker.try_acquire(10));
    }

    #[test]
    fn lower_header_does_not_reduce_local_count() {
        let tracker = RateLimitTracker::per_minute(1000);
        assert!(tracker.try_acquire(50));

        let mut headers = HeaderMap::new();
        headers.insert("X-MBX-USED-WEIGHT-1M", HeaderValue::from_static("7"));
        tracker.update_from_headers(&headers);
        assert_eq!(tracker.snapshot().used_weight, 50);
    }
}
