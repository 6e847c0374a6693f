// =============================================================================
// Trend classification from EMA / MACD / RSI
// =============================================================================
//
// Decision rule (strict AND, no majority vote):
//   Bullish = EMA20 > EMA50  AND  MACD > Signal  AND  RSI > 50
//   Bearish = EMA20 < EMA50  AND  MACD < Signal  AND  RSI < 50
//   Neutral = anything else, including a missing RSI or NaN readings.

use serde::Serialize;
use tracing::debug;

use super::ema::compute_ema;
use super::macd::{compute_macd, compute_signal, FAST_SPAN, SLOW_SPAN};
use super::rsi::{compute_rsi, DEFAULT_RSI_PERIOD};
use crate::errors::ReportError;
use crate::types::TrendLabel;

pub const SHORT_EMA_SPAN: usize = 20;
pub const LONG_EMA_SPAN: usize = 50;

/// Full indicator set, every series aligned with the input closes.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub ema12: Vec<f64>,
    pub ema26: Vec<f64>,
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
}

/// Last value of each series; the only part a report keeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestReadings {
    pub ema12: f64,
    pub ema26: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub macd: f64,
    pub signal: f64,
    pub rsi: Option<f64>,
}

impl IndicatorSeries {
    pub fn compute(closes: &[f64]) -> Self {
        let macd = compute_macd(closes);
        let signal = compute_signal(&macd);
        Self {
            ema12: compute_ema(closes, FAST_SPAN),
            ema26: compute_ema(closes, SLOW_SPAN),
            ema20: compute_ema(closes, SHORT_EMA_SPAN),
            ema50: compute_ema(closes, LONG_EMA_SPAN),
            macd,
            signal,
            rsi: compute_rsi(closes, DEFAULT_RSI_PERIOD),
        }
    }

    pub fn len(&self) -> usize {
        self.ema20.len()
    }

    pub fn latest(&self) -> Result<LatestReadings, ReportError> {
        let missing = || ReportError::Computation("no candles to compute indicators".into());
        Ok(LatestReadings {
            ema12: *self.ema12.last().ok_or_else(missing)?,
            ema26: *self.ema26.last().ok_or_else(missing)?,
            ema20: *self.ema20.last().ok_or_else(missing)?,
            ema50: *self.ema50.last().ok_or_else(missing)?,
            macd: *self.macd.last().ok_or_else(missing)?,
            signal: *self.signal.last().ok_or_else(missing)?,
            rsi: self.rsi.last().copied().flatten(),
        })
    }
}

/// Classify the latest readings into a trend label.
pub fn classify_trend(r: &LatestReadings) -> TrendLabel {
    let Some(rsi) = r.rsi else {
        return TrendLabel::Neutral;
    };

    if r.ema20 > r.ema50 && r.macd > r.signal && rsi > 50.0 {
        TrendLabel::Bullish
    } else if r.ema20 < r.ema50 && r.macd < r.signal && rsi < 50.0 {
        TrendLabel::Bearish
    } else {
        TrendLabel::Neutral
    }
}

/// Compute the indicators for `closes` and classify the result. Failures come
/// back as `TrendLabel::Error`.
pub fn detect_trend(closes: &[f64]) -> TrendLabel {
    let series = IndicatorSeries::compute(closes);
    match series.latest() {
        Ok(latest) => {
            let label = classify_trend(&latest);
            debug!(samples = series.len(), ?latest, ?label, "trend classified");
            label
        }
        Err(e) => TrendLabel::Error(format!("trend calculation failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(ema_up: bool, macd_up: bool, rsi: Option<f64>) -> LatestReadings {
        LatestReadings {
            ema12: 0.0,
            ema26: 0.0,
            ema20: if ema_up { 2.0 } else { 1.0 },
            ema50: if ema_up { 1.0 } else { 2.0 },
            macd: if macd_up { 0.5 } else { -0.5 },
            signal: 0.0,
            rsi,
        }
    }

    #[test]
    fn bullish_requires_all_three() {
        assert_eq!(classify_trend(&readings(true, true, Some(60.0))), TrendLabel::Bullish);
        assert_eq!(classify_trend(&readings(true, true, Some(50.0))), TrendLabel::Neutral);
        assert_eq!(classify_trend(&readings(true, false, Some(60.0))), TrendLabel::Neutral);
        assert_eq!(classify_trend(&readings(false, true, Some(60.0))), TrendLabel::Neutral);
    }

    #[test]
    fn bearish_requires_all_three() {
        assert_eq!(classify_trend(&readings(false, false, Some(40.0))), TrendLabel::Bearish);
        assert_eq!(classify_trend(&readings(false, false, Some(60.0))), TrendLabel::Neutral);
        assert_eq!(classify_trend(&readings(true, false, Some(40.0))), TrendLabel::Neutral);
        assert_eq!(classify_trend(&readings(false, true, Some(40.0))), TrendLabel::Neutral);
    }

    #[test]
    fn every_mixed_combination_is_neutral() {
        for ema_up in [true, false] {
            for macd_up in [true, false] {
                for rsi in [30.0, 70.0] {
                    let label = classify_trend(&readings(ema_up, macd_up, Some(rsi)));
                    let all_up = ema_up && macd_up && rsi > 50.0;
                    let all_down = !ema_up && !macd_up && rsi < 50.0;
                    let expected = if all_up {
                        TrendLabel::Bullish
                    } else if all_down {
                        TrendLabel::Bearish
                    } else {
                        TrendLabel::Neutral
                    };
                    assert_eq!(label, expected);
                }
            }
        }
    }

    #[test]
    fn equal_emas_are_neutral() {
        let r = LatestReadings {
            ema12: 1.0,
            ema26: 1.0,
            ema20: 1.0,
            ema50: 1.0,
            macd: 1.0,
            signal: 0.0,
            rsi: Some(80.0),
        };
        assert_eq!(classify_trend(&r), TrendLabel::Neutral);
    }

    #[test]
    fn missing_rsi_is_neutral() {
        assert_eq!(classify_trend(&readings(true, true, None)), TrendLabel::Neutral);
    }

    #[test]
    fn nan_reading_is_neutral() {
        let mut r = readings(true, true, Some(60.0));
        r.ema20 = f64::NAN;
        assert_eq!(classify_trend(&r), TrendLabel::Neutral);
    }

    #[test]
    fn series_are_aligned_with_closes() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let s = IndicatorSeries::compute(&closes);
        assert_eq!(s.ema12.len(), 40);
        assert_eq!(s.ema26.len(), 40);
        assert_eq!(s.ema20.len(), 40);
        assert_eq!(s.ema50.len(), 40);
        assert_eq!(s.macd.len(), 40);
        assert_eq!(s.signal.len(), 40);
        assert_eq!(s.rsi.len(), 40);
    }

    #[test]
    fn macd_is_the_spread_of_the_stored_emas() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + ((i * 7) % 11) as f64).collect();
        let s = IndicatorSeries::compute(&closes);
        for i in 0..closes.len() {
            assert!((s.macd[i] - (s.ema12[i] - s.ema26[i])).abs() < 1e-12);
        }
        let latest = s.latest().unwrap();
        assert_eq!(latest.ema12, *s.ema12.last().unwrap());
        assert_eq!(latest.ema26, *s.ema26.last().unwrap());
    }

    #[test]
    fn detect_trend_on_empty_is_error() {
        assert!(detect_trend(&[]).is_error());
    }

    #[test]
    fn detect_trend_short_window_is_neutral() {
        assert_eq!(detect_trend(&[100.0, 102.0, 101.0, 105.0, 110.0]), TrendLabel::Neutral);
    }

    #[test]
    fn detect_trend_on_accelerating_rally() {
        // Rising faster and faster with small pullbacks so RSI stays below 100.
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i * i) as f64 * 0.01 - if i % 4 == 0 { 1.0 } else { 0.0 })
            .collect();
        assert_eq!(detect_trend(&closes), TrendLabel::Bullish);
    }

    #[test]
    fn detect_trend_on_accelerating_selloff() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 1000.0 - (i * i) as f64 * 0.01 + if i % 5 == 0 { 0.5 } else { 0.0 })
            .collect();
        assert_eq!(detect_trend(&closes), TrendLabel::Bearish);
    }
}
