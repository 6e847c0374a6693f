// =============================================================================
// Runtime Configuration — battle defaults, exchange endpoint, request budget
// =============================================================================
//
// Loaded from a JSON file at start-up. All fields carry `#[serde(default)]`
// so a partial (or empty) file still deserialises, and a missing file falls
// back to `RuntimeConfig::default()` with a warning.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{SelectionPolicy, Timeframe};

/// Accepted candle counts per symbol, inclusive.
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 1000;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_limit() -> u32 {
    200
}

fn default_max_symbols() -> usize {
    20
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_weight_per_minute() -> u32 {
    1000
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Battle defaults ----------------------------------------------------

    /// Timeframe used when the user supplies none (or an invalid one).
    #[serde(default)]
    pub default_timeframe: Timeframe,

    /// Candle count used when the user supplies none (or an invalid one).
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Maximum number of symbols per batch.
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,

    /// How the batch is chosen from the ticker list.
    #[serde(default)]
    pub selection_policy: SelectionPolicy,

    /// Only pairs quoted in this asset are reported.
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    // --- Exchange -----------------------------------------------------------

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Request-weight budget per rolling minute, shared by all batches.
    #[serde(default = "default_weight_per_minute")]
    pub request_weight_per_minute: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_timeframe: Timeframe::default(),
            default_limit: default_limit(),
            max_symbols: default_max_symbols(),
            selection_policy: SelectionPolicy::default(),
            quote_asset: default_quote_asset(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            request_weight_per_minute: default_weight_per_minute(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;
        config.sanitize();

        info!(
            path = %path.display(),
            default_timeframe = %config.default_timeframe,
            max_symbols = config.max_symbols,
            policy = %config.selection_policy,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `BATTLE_SYMBOL_LIMIT` when it holds a valid number.
    pub fn apply_env_overrides(&mut self) {
        if let Some(n) = std::env::var("BATTLE_SYMBOL_LIMIT")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.max_symbols = n;
        }
        self.sanitize();
    }

    /// Reset values a batch cannot run with to their built-in defaults.
    pub fn sanitize(&mut self) {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.default_limit) {
            warn!(
                configured = self.default_limit,
                fallback = default_limit(),
                "default_limit must be between {MIN_LIMIT} and {MAX_LIMIT}, resetting"
            );
            self.default_limit = default_limit();
        }
        if self.max_symbols == 0 {
            warn!(fallback = default_max_symbols(), "max_symbols must be at least 1, resetting");
            self.max_symbols = default_max_symbols();
        }
    }
}
