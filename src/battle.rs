// =============================================================================
// Battle Runner — one batch of reports
// =============================================================================
//
// Validates the caller's timeframe / limit, fetches the ticker list, selects
// the batch and then, one symbol at a time, fetches candles and builds the
// report. Nothing in here aborts the batch: bad input falls back to the
// configured defaults with a warning, an unavailable ticker list yields zero
// reports plus a notice, and a failing symbol yields a degraded report.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::ReportError;
use crate::market_data::MarketSource;
use crate::report::{build_report, BattleReport};
use crate::runtime_config::{RuntimeConfig, MAX_LIMIT, MIN_LIMIT};
use crate::selection::select_symbols;
use crate::types::{SelectionPolicy, Timeframe};

/// Validated parameters of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleRequest {
    pub timeframe: Timeframe,
    pub limit: u32,
    pub max_symbols: usize,
    pub policy: SelectionPolicy,
    pub quote_asset: String,
}

impl BattleRequest {
    /// Request built purely from configuration defaults.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            timeframe: config.default_timeframe,
            limit: config.default_limit,
            max_symbols: config.max_symbols,
            policy: config.selection_policy,
            quote_asset: config.quote_asset.clone(),
        }
    }

    /// Validate raw user input. Blank values mean "use the default"; invalid
    /// values also fall back to the default but produce a warning message.
    pub fn from_inputs(
        timeframe: Option<&str>,
        limit: Option<&str>,
        config: &RuntimeConfig,
    ) -> (Self, Vec<String>) {
        let mut request = Self::from_config(config);
        let mut warnings = Vec::new();

        if let Some(raw) = timeframe.map(str::trim).filter(|s| !s.is_empty()) {
            match raw.parse::<Timeframe>() {
                Ok(tf) => request.timeframe = tf,
                Err(e) => {
                    warnings.push(format!("{e}, using {}", config.default_timeframe));
                }
            }
        }

        if let Some(raw) = limit.map(str::trim).filter(|s| !s.is_empty()) {
            match raw.parse::<i64>() {
                Ok(n) if (i64::from(MIN_LIMIT)..=i64::from(MAX_LIMIT)).contains(&n) => {
                    request.limit = n as u32;
                }
                Ok(_) => warnings.push(format!(
                    "limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
                )),
                Err(_) => warnings.push("please enter the candle count as a number".to_string()),
            }
        }

        if !warnings.is_empty() {
            warn!(?warnings, "battle input replaced by defaults");
        }
        (request, warnings)
    }
}

/// Result of one batch, as handed to the web page, JSON endpoint and console.
#[derive(Debug, Clone, Serialize)]
pub struct BattleOutcome {
    pub reports: Vec<BattleReport>,
    /// Input-validation messages.
    pub warnings: Vec<String>,
    /// Top-level failure message (e.g. no symbol list).
    pub notice: Option<String>,
    pub timeframe: Timeframe,
    pub limit: u32,
    pub generated_at: DateTime<Utc>,
}

impl BattleOutcome {
    /// Every message that should be surfaced above the reports.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .map(String::as_str)
            .chain(self.notice.as_deref())
    }
}

pub fn symbol_list_notice(quote_asset: &str) -> String {
    format!(
        "cannot retrieve the {} symbol list, please try again later",
        quote_asset.to_uppercase()
    )
}

/// Run one batch against `source`.
pub async fn run_battle<S: MarketSource>(
    source: &S,
    request: &BattleRequest,
    warnings: Vec<String>,
) -> BattleOutcome {
    let mut outcome = BattleOutcome {
        reports: Vec::new(),
        warnings,
        notice: None,
        timeframe: request.timeframe,
        limit: request.limit,
        generated_at: Utc::now(),
    };

    if request.max_symbols == 0 {
        outcome.notice = Some("symbol cap is 0, no symbols were selected".to_string());
        return outcome;
    }

    let symbols = match source.fetch_tickers().await {
        Ok(tickers) => select_symbols(
            &tickers,
            &request.quote_asset,
            request.policy,
            request.max_symbols,
        ),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "ticker fetch failed");
            Vec::new()
        }
    };

    if symbols.is_empty() {
        outcome.notice = Some(symbol_list_notice(&request.quote_asset));
        return outcome;
    }

    for symbol in &symbols {
        let report = match source
            .fetch_candles(symbol, request.timeframe, request.limit)
            .await
        {
            Ok(candles) if candles.is_empty() => {
                warn!(symbol = %symbol, "no OHLCV data returned");
                BattleReport::degraded(symbol, "no OHLCV data returned")
            }
            Ok(candles) => build_report(symbol, &candles),
            Err(e) => {
                let err = ReportError::upstream(&e);
                warn!(symbol = %symbol, error = %err, "candle fetch failed");
                BattleReport::degraded(symbol, err.to_string())
            }
        };
        outcome.reports.push(report);
    }

    let degraded = outcome.reports.iter().filter(|r| r.is_degraded()).count();
    info!(
        timeframe = %request.timeframe,
        limit = request.limit,
        symbols = outcome.reports.len(),
        degraded,
        "battle complete"
    );
    outcome
}
