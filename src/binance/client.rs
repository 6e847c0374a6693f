// =============================================================================
// Binance REST API Client — public market data
// =============================================================================
//
// Only unsigned endpoints are used (klines, exchangeInfo, 24h tickers). Every
// call first reserves its request weight from the shared `RateLimitTracker`
// and refreshes it from the response headers afterwards.
//
// Symbols are exposed in unified `BASE/QUOTE` form (e.g. `BTC/USDT`); the raw
// Binance form (`BTCUSDT`) only appears on the wire.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tracing::{debug, instrument, warn};

use super::rate_limit::RateLimitTracker;
use crate::market_data::{Candle, MarketSource, Ticker};
use crate::runtime_config::RuntimeConfig;
use crate::types::Timeframe;

/// Request weights as documented by Binance (spot API).
const KLINES_WEIGHT: u32 = 2;
const EXCHANGE_INFO_WEIGHT: u32 = 20;
const TICKER_24H_ALL_WEIGHT: u32 = 80;

#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    limiter: Arc<RateLimitTracker>,
}

impl BinanceClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &RuntimeConfig, limiter: Arc<RateLimitTracker>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.base_url, "BinanceClient initialised");

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            limiter,
        })
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    /// GET `{base_url}{path}` after reserving `weight`; non-2xx is an error.
    async fn get_public(&self, path: &str, query: &[(&str, String)], weight: u32) -> Result<serde_json::Value> {
        if !self.limiter.try_acquire(weight) {
            anyhow::bail!("request budget exhausted, GET {path} (weight {weight}) refused");
        }

        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        self.limiter.update_from_headers(resp.headers());

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {path} response"))?;

        if !status.is_success() {
            anyhow::bail!("Binance GET {path} returned {status}: {body}");
        }

        Ok(body)
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /api/v3/klines for a raw symbol such as `BTCUSDT`.
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(&self, raw_symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        let query = [
            ("symbol", raw_symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let body = self.get_public("/api/v3/klines", &query, KLINES_WEIGHT).await?;
        let candles = parse_klines(&body)?;
        debug!(raw_symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }

    /// GET /api/v3/exchangeInfo and GET /api/v3/ticker/24hr, joined into
    /// unified-symbol tickers for every pair currently trading.
    #[instrument(skip(self), name = "binance::get_tickers")]
    pub async fn get_tickers(&self) -> Result<HashMap<String, Ticker>> {
        let info = self
            .get_public("/api/v3/exchangeInfo", &[], EXCHANGE_INFO_WEIGHT)
            .await?;
        let tickers = self
            .get_public("/api/v3/ticker/24hr", &[], TICKER_24H_ALL_WEIGHT)
            .await?;

        let unified = parse_exchange_symbols(&info)?;
        let result = parse_tickers(&tickers, &unified)?;
        debug!(markets = unified.len(), tickers = result.len(), "tickers fetched");
        Ok(result)
    }
}

impl MarketSource for BinanceClient {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe, limit: u32) -> Result<Vec<Candle>> {
        self.get_klines(&raw_symbol(symbol), timeframe.as_str(), limit)
            .await
    }

    async fn fetch_tickers(&self) -> Result<HashMap<String, Ticker>> {
        self.get_tickers().await
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .finish()
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

/// `BTC/USDT` -> `BTCUSDT`
pub fn raw_symbol(unified: &str) -> String {
    unified.replace('/', "").to_uppercase()
}

/// Parse Binance's array-of-arrays kline payload.
///
/// Array indices:
///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume, ...
pub fn parse_klines(body: &serde_json::Value) -> Result<Vec<Candle>> {
    let raw = body.as_array().context("klines response is not an array")?;
    let mut candles = Vec::with_capacity(raw.len());

    for entry in raw {
        let arr = entry.as_array().context("kline entry is not an array")?;
        if arr.len() < 6 {
            warn!("skipping malformed kline entry with {} elements", arr.len());
            continue;
        }

        let open_ms = arr[0].as_i64().context("kline open time is not an integer")?;
        let open_time = Utc
            .timestamp_millis_opt(open_ms)
            .single()
            .with_context(|| format!("invalid kline open time {open_ms}"))?;

        candles.push(Candle::new(
            open_time,
            parse_str_f64(&arr[1])?,
            parse_str_f64(&arr[2])?,
            parse_str_f64(&arr[3])?,
            parse_str_f64(&arr[4])?,
            parse_str_f64(&arr[5])?,
        ));
    }

    Ok(candles)
}

/// Map raw symbol -> unified `BASE/QUOTE` for every market with status TRADING.
pub fn parse_exchange_symbols(body: &serde_json::Value) -> Result<HashMap<String, String>> {
    let symbols = body["symbols"]
        .as_array()
        .context("exchangeInfo response missing 'symbols' array")?;

    Ok(symbols
        .iter()
        .filter(|s| s["status"].as_str() == Some("TRADING"))
        .filter_map(|s| {
            let raw = s["symbol"].as_str()?;
            let base = s["baseAsset"].as_str()?;
            let quote = s["quoteAsset"].as_str()?;
            Some((raw.to_string(), format!("{base}/{quote}")))
        })
        .collect())
}

/// Join 24h ticker entries with the unified symbol map. Tickers for unknown
/// or non-trading symbols are dropped.
pub fn parse_tickers(
    body: &serde_json::Value,
    unified: &HashMap<String, String>,
) -> Result<HashMap<String, Ticker>> {
    let entries = body.as_array().context("ticker/24hr response is not an array")?;
    let mut tickers = HashMap::with_capacity(entries.len());

    for entry in entries {
        let Some(symbol) = entry["symbol"].as_str().and_then(|raw| unified.get(raw)) else {
            continue;
        };
        let quote_volume = parse_str_f64(&entry["quoteVolume"]).unwrap_or(0.0);
        tickers.insert(
            symbol.clone(),
            Ticker {
                symbol: symbol.clone(),
                quote_volume,
            },
        );
    }

    Ok(tickers)
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_symbol_strips_separator() {
        assert_eq!(raw_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(raw_symbol("eth/usdt"), "ETHUSDT");
    }

    #[test]
    fn parse_klines_reads_ohlcv() {
        let body = json!([
            [1700000000000i64, "100.0", "101.5", "99.0", "100.7", "12.5", 1700003599999i64, "1250.0", 42, "6.0", "600.0", "0"],
            [1700003600000i64, "100.7", "103.0", "100.1", "102.9", "8.0", 1700007199999i64, "820.0", 17, "4.0", "410.0", "0"]
        ]);
        let candles = parse_klines(&body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(candles[0].high, 101.5);
        assert_eq!(candles[1].close, 102.9);
        assert_eq!(candles[1].volume, 8.0);
    }

    #[test]
    fn parse_klines_skips_short_rows() {
        let body = json!([[1700000000000i64, "1"], [1700000000000i64, "1", "2", "0.5", "1.5", "3"]]);
        assert_eq!(parse_klines(&body).unwrap().len(), 1);
    }

    #[test]
    fn parse_klines_rejects_non_array() {
        assert!(parse_klines(&json!({"code": -1121, "msg": "Invalid symbol."})).is_err());
    }

    #[test]
    fn parse_klines_rejects_bad_number() {
        let body = json!([[1700000000000i64, "abc", "2", "0.5", "1.5", "3"]]);
        assert!(parse_klines(&body).is_err());
    }

    #[test]
    fn tickers_join_with_exchange_info() {
        let info = json!({
            "symbols": [
                {"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT", "status": "TRADING"},
                {"symbol": "ETHBTC", "baseAsset": "ETH", "quoteAsset": "BTC", "status": "TRADING"},
                {"symbol": "LUNAUSDT", "baseAsset": "LUNA", "quoteAsset": "USDT", "status": "BREAK"}
            ]
        });
        let tickers = json!([
            {"symbol": "BTCUSDT", "quoteVolume": "1500000000.5"},
            {"symbol": "ETHBTC", "quoteVolume": "900.0"},
            {"symbol": "LUNAUSDT", "quoteVolume": "1.0"},
            {"symbol": "NEWUSDT", "quoteVolume": "5.0"}
        ]);

        let unified = parse_exchange_symbols(&info).unwrap();
        assert_eq!(unified.len(), 2);
        assert_eq!(unified["BTCUSDT"], "BTC/USDT");

        let parsed = parse_tickers(&tickers, &unified).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["BTC/USDT"].quote_volume, 1_500_000_000.5);
        assert!(parsed.contains_key("ETH/BTC"));
        assert!(!parsed.contains_key("LUNA/USDT"));
    }

    #[test]
    fn missing_quote_volume_defaults_to_zero() {
        let unified = HashMap::from([("BTCUSDT".to_string(), "BTC/USDT".to_string())]);
        let parsed = parse_tickers(&json!([{"symbol": "BTCUSDT"}]), &unified).unwrap();
        assert_eq!(parsed["BTC/USDT"].quote_volume, 0.0);
    }

    #[tokio::test]
    async fn exhausted_budget_refuses_before_sending() {
        let config = RuntimeConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..RuntimeConfig::default()
        };
        let client = BinanceClient::new(&config, Arc::new(RateLimitTracker::per_minute(1))).unwrap();
        let err = client
            .fetch_candles("BTC/USDT", Timeframe::H1, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("request budget exhausted"));
        assert_eq!(client.limiter.snapshot().used_weight, 0);
    }
}
