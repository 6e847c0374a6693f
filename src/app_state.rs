// =============================================================================
// Central Application State
// =============================================================================
//
// Shared by every request handler via `Arc<AppState<S>>`. The market source is
// generic so the router can be driven by the live Binance client or by an
// in-memory source in tests.
//
// Thread safety:
//   - Atomic counter for the number of battles served.
//   - parking_lot::RwLock around the most recent outcome.
//   - The rate-limit tracker manages its own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::battle::BattleOutcome;
use crate::binance::{RateLimitSnapshot, RateLimitTracker};
use crate::market_data::MarketSource;
use crate::runtime_config::RuntimeConfig;

pub struct AppState<S> {
    pub runtime_config: RuntimeConfig,
    pub source: S,
    pub limiter: Arc<RateLimitTracker>,

    battles_served: AtomicU64,
    last_outcome: RwLock<Option<BattleSummary>>,
    started_at: DateTime<Utc>,
}

/// Compact record of the most recent batch, exposed on the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BattleSummary {
    pub generated_at: DateTime<Utc>,
    pub timeframe: String,
    pub limit: u32,
    pub reports: usize,
    pub degraded: usize,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub server_time: i64,
    pub uptime_secs: i64,
    pub battles_served: u64,
    pub rate_limit: RateLimitSnapshot,
    pub last_battle: Option<BattleSummary>,
}

impl<S: MarketSource> AppState<S> {
    pub fn new(runtime_config: RuntimeConfig, source: S, limiter: Arc<RateLimitTracker>) -> Self {
        Self {
            runtime_config,
            source,
            limiter,
            battles_served: AtomicU64::new(0),
            last_outcome: RwLock::new(None),
            started_at: Utc::now(),
        }
    }

    /// Record a finished batch.
    pub fn record_outcome(&self, outcome: &BattleOutcome) {
        self.battles_served.fetch_add(1, Ordering::Relaxed);
        *self.last_outcome.write() = Some(BattleSummary {
            generated_at: outcome.generated_at,
            timeframe: outcome.timeframe.to_string(),
            limit: outcome.limit,
            reports: outcome.reports.len(),
            degraded: outcome.reports.iter().filter(|r| r.is_degraded()).count(),
            notice: outcome.notice.clone(),
        });
    }

    pub fn battles_served(&self) -> u64 {
        self.battles_served.load(Ordering::Relaxed)
    }

    pub fn health(&self) -> HealthSnapshot {
        let now = Utc::now();
        HealthSnapshot {
            status: "ok",
            server_time: now.timestamp_millis(),
            uptime_secs: (now - self.started_at).num_seconds(),
            battles_served: self.battles_served(),
            rate_limit: self.limiter.snapshot(),
            last_battle: self.last_outcome.read().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::FakeMarket;
    use crate::report::BattleReport;
    use crate::types::Timeframe;

    #[test]
    fn record_outcome_updates_health() {
        let state = AppState::new(
            RuntimeConfig::default(),
            FakeMarket::default(),
            Arc::new(RateLimitTracker::per_minute(100)),
        );
        assert_eq!(state.health().battles_served, 0);
        assert!(state.health().last_battle.is_none());

        let outcome = BattleOutcome {
            reports: vec![BattleReport::degraded("BTC/USDT", "boom")],
            warnings: Vec::new(),
            notice: None,
            timeframe: Timeframe::M15,
            limit: 50,
            generated_at: Utc::now(),
        };
        state.record_outcome(&outcome);

        let health = state.health();
        assert_eq!(health.battles_served, 1);
        assert_eq!(health.rate_limit.weight_limit, 100);
        let last = health.last_battle.unwrap();
        assert_eq!(last.timeframe, "15m");
        assert_eq!(last.degraded, 1);
    }
}
