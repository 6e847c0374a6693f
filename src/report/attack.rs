// =============================================================================
// Price ATK — percentage change across the window
// =============================================================================
//
//   change = (last_close - first_close) / first_close * 100
// =============================================================================

use serde::Serialize;

use crate::errors::ReportError;
use crate::types::AttackStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAttack {
    pub change_pct: f64,
    pub status: AttackStatus,
}

impl PriceAttack {
    /// e.g. `10.00% 🔥`
    pub fn render(&self) -> String {
        format!("{:.2}% {}", self.change_pct, self.status.icon())
    }
}

pub fn price_change_attack(closes: &[f64]) -> Result<PriceAttack, ReportError> {
    let (Some(&first), Some(&last)) = (closes.first(), closes.last()) else {
        return Err(ReportError::Computation("no closes in window".into()));
    };

    if first == 0.0 {
        return Err(ReportError::Computation("first close is zero".into()));
    }

    let change_pct = (last - first) / first * 100.0;
    if !change_pct.is_finite() {
        return Err(ReportError::Computation(format!(
            "non-finite change from {first} to {last}"
        )));
    }

    Ok(PriceAttack {
        change_pct,
        status: AttackStatus::from_change(change_pct),
    })
}
