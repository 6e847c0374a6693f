// =============================================================================
// MarketSource — the exchange seam used by the battle runner
// =============================================================================

use std::collections::HashMap;
use std::future::Future;

use anyhow::Result;

use super::{Candle, Ticker};
use crate::types::Timeframe;

/// Anything that can supply candles and tickers. `BinanceClient` is the
/// production implementation; tests use in-memory sources.
pub trait MarketSource: Send + Sync {
    /// Most recent `limit` candles for a unified symbol such as `BTC/USDT`,
    /// oldest first.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// 24h tickers keyed by unified symbol.
    fn fetch_tickers(&self) -> impl Future<Output = Result<HashMap<String, Ticker>>> + Send;
}
