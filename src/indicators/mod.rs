// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the scanner
// computes per symbol. Every public function returns `Option<T>`, a
// possibly-shorter series, or a plain bool so callers are forced to handle
// insufficient-data and numerical-edge-case scenarios.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod macd;
pub mod pivots;
pub mod rsi;
pub mod supertrend;
pub mod volume;
pub mod vwap;
