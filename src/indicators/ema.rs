// =============================================================================
// Exponential Moving Average (EMA) — adjusted form
// =============================================================================
//
// Every prior sample carries weight, decaying geometrically with age:
//
//   alpha = 2 / (span + 1)
//   EMA_t = sum_{i=0..t} (1 - alpha)^i * x_{t-i}  /  sum_{i=0..t} (1 - alpha)^i
//
// Computed recursively with a running numerator and denominator:
//
//   num_t = x_t + (1 - alpha) * num_{t-1}
//   den_t = 1   + (1 - alpha) * den_{t-1}
//
// Short inputs never fail: the first output is the first close and the
// smoothing window simply widens as samples accumulate.
// =============================================================================

/// Compute the adjusted EMA series for `values` with the given `span`.
///
/// The output is position-aligned with the input (same length). A `span` of
/// 0 is treated as 1, which makes the series the identity.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span <= 1`  => output equals input
/// - a NaN input poisons the running sums from that point on, exactly like
///   any other arithmetic on NaN.
pub fn compute_ema(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut result = Vec::with_capacity(values.len());
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for &x in values {
        numerator = x + decay * numerator;
        denominator = 1.0 + decay * denominator;
        result.push(numerator / denominator);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ema_empty_input() {
        assert!(compute_ema(&[], 20).is_empty());
    }

    #[test]
    fn ema_span_one_is_identity() {
        let closes = vec![100.0, 102.0, 101.0, 105.0, 110.0];
        assert_eq!(compute_ema(&closes, 1), closes);
    }

    #[test]
    fn ema_span_zero_treated_as_one() {
        let closes = vec![3.0, 1.0, 4.0];
        assert_eq!(compute_ema(&closes, 0), closes);
    }

    #[test]
    fn ema_first_value_is_first_close() {
        let ema = compute_ema(&[42.0, 50.0], 20);
        assert!(approx(ema[0], 42.0));
    }

    #[test]
    fn ema_matches_weighted_definition() {
        // span = 3 => alpha = 0.5, decay = 0.5
        // t=1: (2 + 0.5*1) / (1 + 0.5)               = 2.5 / 1.5
        // t=2: (3 + 0.5*2 + 0.25*1) / (1 + 0.5 + 0.25) = 4.25 / 1.75
        let ema = compute_ema(&[1.0, 2.0, 3.0], 3);
        assert_eq!(ema.len(), 3);
        assert!(approx(ema[0], 1.0));
        assert!(approx(ema[1], 2.5 / 1.5));
        assert!(approx(ema[2], 4.25 / 1.75));
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let ema = compute_ema(&vec![7.5; 60], 50);
        for v in ema {
            assert!(approx(v, 7.5));
        }
    }

    #[test]
    fn ema_shorter_span_tracks_uptrend_closer() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let fast = *compute_ema(&closes, 20).last().unwrap();
        let slow = *compute_ema(&closes, 50).last().unwrap();
        assert!(fast > slow, "fast {fast} should lead slow {slow} in an uptrend");
        assert!(fast < 100.0);
    }
}
