// =============================================================================
// Shared types used across the battle report pipeline
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ReportError;

// =============================================================================
// Timeframe
// =============================================================================

/// Candle interval offered to the user. The wire names match Binance's
/// `interval` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// Every selectable timeframe, in the order shown on the web form.
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::H1
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == wanted)
            .ok_or_else(|| ReportError::InvalidInput(format!("unsupported timeframe '{wanted}'")))
    }
}

// =============================================================================
// Trend classification
// =============================================================================

/// Discrete trend derived from the latest EMA / MACD / RSI readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "reason")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Neutral,
    Error(String),
}

impl TrendLabel {
    /// Display text shown next to the symbol.
    pub fn headline(&self) -> String {
        match self {
            Self::Bullish => "⚔️ Bullish Power! 💥 Fighters are on the attack!".to_string(),
            Self::Bearish => "🛡️ Bearish Defense! 😓 Fighters are retreating!".to_string(),
            Self::Neutral => "🏳️ Neutral Zone! ⚖️ Temporary ceasefire".to_string(),
            Self::Error(reason) => format!("⚠️ Error: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

// =============================================================================
// Status buckets
// =============================================================================

/// How close the current price sits to the top of its swing range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Strong,
    Caution,
    Critical,
}

impl HealthStatus {
    pub fn from_percentage(pct: f64) -> Self {
        if pct > 70.0 {
            Self::Strong
        } else if pct > 30.0 {
            Self::Caution
        } else {
            Self::Critical
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Strong => "💪",
            Self::Caution => "⚠️",
            Self::Critical => "🩸",
        }
    }
}

/// Magnitude bucket of the window's percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStatus {
    High,
    Medium,
    Low,
}

impl AttackStatus {
    pub fn from_change(change_pct: f64) -> Self {
        let magnitude = change_pct.abs();
        if magnitude > 5.0 {
            Self::High
        } else if magnitude > 2.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::High => "🔥",
            Self::Medium => "⚡",
            Self::Low => "🛡️",
        }
    }
}

// =============================================================================
// Metric — explicit "value or reason" for every report field
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }

    /// Render the value with `f`, or the "N/A" placeholder.
    pub fn render_with(&self, f: impl FnOnce(&T) -> String) -> String {
        self.value().map_or_else(|| "N/A".to_string(), f)
    }
}

impl<T> From<Result<T, ReportError>> for Metric<T> {
    fn from(result: Result<T, ReportError>) -> Self {
        match result {
            Ok(v) => Self::Available(v),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }
}

// =============================================================================
// Symbol selection policy
// =============================================================================

/// How the batch of symbols is chosen from the ticker list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Rank by 24h quote volume, highest first.
    #[default]
    TopVolume,
    /// Take the first N symbols in name order.
    Prefix,
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopVolume => write!(f, "top_volume"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}
