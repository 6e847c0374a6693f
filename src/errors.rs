// =============================================================================
// Report error taxonomy
// =============================================================================
//
// Every failure inside a batch is converted into one of these close to where
// it happens, then folded into a degraded-but-present result. Infrastructure
// code (config, HTTP client, server) stays on `anyhow`.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("cannot fetch market data: {0}")]
    Upstream(String),

    #[error("calculation failed: {0}")]
    Computation(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl ReportError {
    /// Wrap an exchange-side failure, keeping the whole context chain.
    pub fn upstream(err: &anyhow::Error) -> Self {
        Self::Upstream(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn upstream_keeps_context_chain() {
        let err = Err::<(), _>(anyhow::anyhow!("connection reset"))
            .context("GET /api/v3/klines request failed")
            .unwrap_err();
        let wrapped = ReportError::upstream(&err);
        let text = wrapped.to_string();
        assert!(text.starts_with("cannot fetch market data"));
        assert!(text.contains("klines"));
        assert!(text.contains("connection reset"));
    }
}
