// =============================================================================
// Price Health Bar
// =============================================================================
//
// Where the current price sits inside the window's [swing_low, swing_high]
// range, drawn as a 10-unit bar:
//
//   normalized = (current - low) / (high - low), clamped to [0, 1]
//   filled     = floor(normalized * 10)
//
// A flat window (high == low) is reported as a full bar at 100%.
// =============================================================================

use serde::Serialize;

use crate::errors::ReportError;
use crate::types::HealthStatus;

pub const BAR_UNITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHealth {
    pub filled: usize,
    pub percentage: f64,
    pub status: HealthStatus,
}

impl PriceHealth {
    fn full() -> Self {
        Self {
            filled: BAR_UNITS,
            percentage: 100.0,
            status: HealthStatus::Strong,
        }
    }

    /// The bar glyphs alone, e.g. `██████░░░░`.
    pub fn bar(&self) -> String {
        let filled = self.filled.min(BAR_UNITS);
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_UNITS - filled))
    }

    /// Bar, percentage and status icon, e.g. `██████░░░░ 63.2% ⚠️`.
    /// `style_bar` wraps the glyphs (colour codes, markup) and leaves the
    /// rest untouched.
    pub fn render(&self, style_bar: impl FnOnce(&str) -> String) -> String {
        format!(
            "{} {:.1}% {}",
            style_bar(&self.bar()),
            self.percentage,
            self.status.icon()
        )
    }
}

pub fn price_health_bar(
    current_price: f64,
    swing_high: f64,
    swing_low: f64,
) -> Result<PriceHealth, ReportError> {
    if !(current_price.is_finite() && swing_high.is_finite() && swing_low.is_finite()) {
        return Err(ReportError::Computation(format!(
            "non-finite price data (current={current_price}, high={swing_high}, low={swing_low})"
        )));
    }

    let total_range = swing_high - swing_low;
    if total_range == 0.0 {
        return Ok(PriceHealth::full());
    }
    if total_range < 0.0 {
        return Err(ReportError::Computation(format!(
            "swing high {swing_high} is below swing low {swing_low}"
        )));
    }

    let normalized = ((current_price - swing_low) / total_range).clamp(0.0, 1.0);
    let filled = ((normalized * BAR_UNITS as f64).floor() as usize).min(BAR_UNITS);
    let percentage = normalized * 100.0;

    Ok(PriceHealth {
        filled,
        percentage,
        status: HealthStatus::from_percentage(percentage),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_range_is_full_bar() {
        let h = price_health_bar(50.0, 50.0, 50.0).unwrap();
        assert_eq!(h.filled, 10);
        assert_eq!(h.percentage, 100.0);
        assert_eq!(h.status, HealthStatus::Strong);
        assert_eq!(h.bar(), "██████████");
    }

    #[test]
    fn midpoint_is_half_bar() {
        let h = price_health_bar(105.0, 110.0, 100.0).unwrap();
        assert_eq!(h.filled, 5);
        assert!((h.percentage - 50.0).abs() < 1e-9);
        assert_eq!(h.status, HealthStatus::Caution);
        assert_eq!(h.render(|bar| bar.to_string()), "█████░░░░░ 50.0% ⚠️");
    }

    #[test]
    fn top_and_bottom_of_range() {
        let top = price_health_bar(110.0, 110.0, 100.0).unwrap();
        assert_eq!(top.filled, 10);
        assert_eq!(top.status, HealthStatus::Strong);

        let bottom = price_health_bar(100.0, 110.0, 100.0).unwrap();
        assert_eq!(bottom.filled, 0);
        assert_eq!(bottom.percentage, 0.0);
        assert_eq!(bottom.status, HealthStatus::Critical);
        assert_eq!(bottom.bar(), "░░░░░░░░░░");
    }

    #[test]
    fn percentage_always_within_bounds() {
        let cases = [
            (120.0, 110.0, 100.0),
            (90.0, 110.0, 100.0),
            (100.0001, 110.0, 100.0),
            (0.5, 1.0, 0.0),
            (3.3, 7.1, 1.9),
        ];
        for (current, high, low) in cases {
            let h = price_health_bar(current, high, low).unwrap();
            assert!((0.0..=100.0).contains(&h.percentage), "{h:?}");
            assert!(h.filled <= BAR_UNITS);
        }
    }

    #[test]
    fn status_buckets() {
        assert_eq!(price_health_bar(8.0, 10.0, 0.0).unwrap().status, HealthStatus::Strong);
        assert_eq!(price_health_bar(7.0, 10.0, 0.0).unwrap().status, HealthStatus::Caution);
        assert_eq!(price_health_bar(3.0, 10.0, 0.0).unwrap().status, HealthStatus::Critical);
    }

    #[test]
    fn non_finite_input_is_error() {
        assert!(price_health_bar(f64::NAN, 1.0, 0.0).is_err());
        assert!(price_health_bar(1.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn inverted_range_is_error() {
        assert!(price_health_bar(1.0, 0.0, 2.0).is_err());
    }
}
