// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages
// =============================================================================
//
// Step 1: Deltas of consecutive closes. The first sample has no predecessor
//         and contributes a zero delta, so the series stays aligned.
// Step 2: Split deltas into gains (positive part) and losses (magnitude of
//         the negative part).
// Step 3: Simple mean of gains / losses over the trailing `period` samples.
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// The first RSI value appears at index `period - 1`; earlier slots are `None`.
// =============================================================================

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned with the input.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - fewer than `period` closes => all `None`
/// - average loss zero (only gains) => 100.0
/// - no movement at all => 50.0
/// - NaN deltas count as neither gain nor loss
pub fn compute_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    let (gains, losses) = gains_and_losses(closes);
    let period_f = period as f64;

    for end in (period - 1)..closes.len() {
        let start = end + 1 - period;
        let avg_gain = gains[start..=end].iter().sum::<f64>() / period_f;
        let avg_loss = losses[start..=end].iter().sum::<f64>() / period_f;
        result[end] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Gains and losses per sample, first sample zero.
fn gains_and_losses(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    (gains, losses)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is non-finite (NaN closes).
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
