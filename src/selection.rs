// =============================================================================
// Symbol selection
// =============================================================================
//
// Picks the batch of symbols to report on. Only pairs quoted in the configured
// asset (suffix `/<QUOTE>`) qualify; the policy then decides ordering and the
// cap limits how many outbound candle requests a batch makes.

use std::collections::HashMap;

use tracing::debug;

use crate::market_data::Ticker;
use crate::types::SelectionPolicy;

pub fn select_symbols(
    tickers: &HashMap<String, Ticker>,
    quote_asset: &str,
    policy: SelectionPolicy,
    max_symbols: usize,
) -> Vec<String> {
    let suffix = format!("/{}", quote_asset.to_uppercase());
    let mut candidates: Vec<&Ticker> = tickers
        .values()
        .filter(|t| t.symbol.ends_with(&suffix))
        .collect();

    match policy {
        SelectionPolicy::TopVolume => candidates.sort_by(|a, b| {
            b.quote_volume
                .total_cmp(&a.quote_volume)
                .then_with(|| a.symbol.cmp(&b.symbol))
        }),
        SelectionPolicy::Prefix => candidates.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
    }

    let eligible = candidates.len();
    let selected: Vec<String> = candidates
        .into_iter()
        .take(max_symbols)
        .map(|t| t.symbol.clone())
        .collect();

    debug!(
        %policy,
        quote_asset,
        eligible,
        selected = selected.len(),
        "symbols selected"
    );
    selected
}
