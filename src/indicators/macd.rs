// =============================================================================
// MACD — fast/slow EMA spread and its signal line
// =============================================================================
//
//   MACD   = EMA12(close) - EMA26(close)
//   Signal = EMA9(MACD)
// =============================================================================

use super::ema::compute_ema;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// MACD line, position-aligned with `closes`.
pub fn compute_macd(closes: &[f64]) -> Vec<f64> {
    macd_line(
        &compute_ema(closes, FAST_SPAN),
        &compute_ema(closes, SLOW_SPAN),
    )
}

/// Element-wise `fast - slow`.
fn macd_line(fast: &[f64], slow: &[f64]) -> Vec<f64> {
    fast.iter().zip(slow).map(|(f, s)| f - s).collect()
}

/// Signal line: EMA9 of the MACD line.
pub fn compute_signal(macd: &[f64]) -> Vec<f64> {
    compute_ema(macd, SIGNAL_SPAN)
}
