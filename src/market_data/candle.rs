use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV candle. Sequences are chronological (oldest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 24-hour ticker summary for one unified symbol (e.g. `BTC/USDT`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub quote_volume: f64,
}

/// Close prices of `candles`, oldest first.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Highest high and lowest low across the window, or `None` when empty.
pub fn swing_range(candles: &[Candle]) -> Option<(f64, f64)> {
    let first = candles.first()?;
    Some(
        candles
            .iter()
            .skip(1)
            .fold((first.high, first.low), |(hi, lo), c| {
                (hi.max(c.high), lo.min(c.low))
            }),
    )
}
