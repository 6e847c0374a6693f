// =============================================================================
// Battle Report assembly
// =============================================================================
//
// One report per symbol. Field-level failures become `Metric::Unavailable`;
// a failure of the whole computation yields the degraded report (every
// numeric field unavailable, trend carrying the reason) so the caller can
// still render one row per symbol.
// =============================================================================

use serde::Serialize;
use tracing::warn;

use super::attack::{price_change_attack, PriceAttack};
use super::price_bar::{price_health_bar, PriceHealth};
use crate::errors::ReportError;
use crate::indicators::detect_trend;
use crate::market_data::candle::{closes, swing_range};
use crate::market_data::Candle;
use crate::types::{Metric, TrendLabel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub symbol: String,
    pub trend: TrendLabel,
    pub current_price: Metric<f64>,
    pub price_health: Metric<PriceHealth>,
    pub swing_high: Metric<f64>,
    pub swing_low: Metric<f64>,
    pub price_attack: Metric<PriceAttack>,
}

impl BattleReport {
    /// Report for a symbol whose data could not be turned into numbers.
    pub fn degraded(symbol: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            symbol: symbol.to_string(),
            trend: TrendLabel::Error(reason.clone()),
            current_price: Metric::Unavailable(reason.clone()),
            price_health: Metric::Unavailable(reason.clone()),
            swing_high: Metric::Unavailable(reason.clone()),
            swing_low: Metric::Unavailable(reason.clone()),
            price_attack: Metric::Unavailable(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.trend.is_error() && !self.current_price.is_available()
    }
}

/// Build the report for `symbol` from its candle window.
pub fn build_report(symbol: &str, candles: &[Candle]) -> BattleReport {
    match try_build_report(symbol, candles) {
        Ok(report) => report,
        Err(e) => {
            warn!(symbol, error = %e, "battle report degraded");
            BattleReport::degraded(symbol, e.to_string())
        }
    }
}

fn try_build_report(symbol: &str, candles: &[Candle]) -> Result<BattleReport, ReportError> {
    let last = candles
        .last()
        .ok_or_else(|| ReportError::Computation("empty candle window".into()))?;
    let (swing_high, swing_low) = swing_range(candles)
        .ok_or_else(|| ReportError::Computation("empty candle window".into()))?;

    let current_price = last.close;
    let closes = closes(candles);

    let price_health = price_health_bar(current_price, swing_high, swing_low);
    if let Err(e) = &price_health {
        warn!(symbol, error = %e, "price health unavailable");
    }
    let price_attack = price_change_attack(&closes);
    if let Err(e) = &price_attack {
        warn!(symbol, error = %e, "price attack unavailable");
    }

    Ok(BattleReport {
        symbol: symbol.to_string(),
        trend: detect_trend(&closes),
        current_price: Metric::Available(current_price),
        price_health: price_health.into(),
        swing_high: Metric::Available(swing_high),
        swing_low: Metric::Available(swing_low),
        price_attack: price_attack.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttackStatus;
    use chrono::{TimeZone, Utc};

    fn candles_from(rows: &[(f64, f64, f64)]) -> Vec<Candle> {
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| {
                let ts = Utc.timestamp_millis_opt(1_700_000_000_000 + i as i64 * 3_600_000).unwrap();
                Candle::new(ts, close, high, low, close, 10.0)
            })
            .collect()
    }

    #[test]
    fn five_candle_scenario() {
        let candles = candles_from(&[
            (100.5, 99.0, 100.0),
            (103.0, 99.5, 102.0),
            (102.5, 100.2, 101.0),
            (106.0, 100.8, 105.0),
            (111.0, 104.0, 110.0),
        ]);
        let report = build_report("BTC/USDT", &candles);

        assert_eq!(report.symbol, "BTC/USDT");
        assert_eq!(report.current_price, Metric::Available(110.0));
        assert_eq!(report.swing_high, Metric::Available(111.0));
        assert_eq!(report.swing_low, Metric::Available(99.0));
        assert_eq!(report.trend, TrendLabel::Neutral);

        let atk = report.price_attack.value().unwrap();
        assert!((atk.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(atk.status, AttackStatus::High);

        // (110 - 99) / (111 - 99) = 91.67%
        let health = report.price_health.value().unwrap();
        assert_eq!(health.filled, 9);
        assert!((health.percentage - 91.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn empty_window_degrades() {
        let report = build_report("ETH/USDT", &[]);
        assert!(report.is_degraded());
        assert!(!report.swing_high.is_available());
        assert!(!report.price_attack.is_available());
        match &report.trend {
            TrendLabel::Error(reason) => assert!(reason.contains("empty candle window")),
            other => panic!("expected error trend, got {other:?}"),
        }
    }

    #[test]
    fn zero_first_close_only_loses_attack() {
        let candles = candles_from(&[(1.0, 0.0, 0.0), (2.0, 0.5, 1.5)]);
        let report = build_report("ODD/USDT", &candles);
        assert!(!report.is_degraded());
        assert!(report.current_price.is_available());
        assert!(report.price_health.is_available());
        assert!(matches!(report.price_attack, Metric::Unavailable(_)));
    }

    #[test]
    fn degraded_report_marks_every_field_unavailable() {
        let report = BattleReport::degraded("SOL/USDT", "timeout");
        assert_eq!(report.current_price, Metric::Unavailable("timeout".into()));
        assert_eq!(report.swing_high, Metric::Unavailable("timeout".into()));
        assert_eq!(report.swing_low, Metric::Unavailable("timeout".into()));
        assert_eq!(report.price_health, Metric::Unavailable("timeout".into()));
        assert_eq!(report.price_attack, Metric::Unavailable("timeout".into()));
        assert!(report.is_degraded());
    }

    #[test]
    fn degraded_report_serialises_reason() {
        let report = BattleReport::degraded("XRP/USDT", "boom");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["trend"]["kind"], "Error");
        assert_eq!(json["trend"]["reason"], "boom");
        assert_eq!(json["current_price"]["status"], "unavailable");
    }
}
