// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator math. Every series is position-aligned
// with the closes it was computed from, so "latest value" is always `last()`.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod trend;

pub use trend::detect_trend;
