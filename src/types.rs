// =============================================================================
// Shared types used across the Meridian market scanner
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::pivots::PivotLevels;

/// A single OHLCV bar from the intraday charts endpoint.
///
/// Bars are always chronological (oldest first). `timestamp` is epoch seconds
/// and is zero when the feed omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default)]
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One row of the symbol master: the static identity of a scannable
/// instrument, including the last traded price used for the CSV prefilter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub company_name: String,
    pub security_id: String,
    pub ltp: f64,
}

/// Direction of the supertrend band at the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Price-vs-VWAP bias for a scanned symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Buy,
    Sell,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Signal confidence grade. `A` requires a volume spike together with an RSI
/// reading well away from the neutral zone; everything else is `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    A,
    B,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Last-bar values of every indicator for one symbol, plus the symbol's
/// static identity. Rebuilt from scratch on every refresh cycle — nothing in
/// here survives across scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub company_name: String,
    pub security_id: String,

    /// Last close of the fetched window (the live price the classifier uses).
    pub last_price: f64,
    /// Volume of the most recent bar (volume filters apply to this).
    pub last_volume: f64,

    pub rsi: f64,
    pub ema9: f64,
    pub ema26: f64,
    pub ema50: f64,
    pub vwap: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub adx: f64,
    pub supertrend: f64,
    pub supertrend_direction: TrendDirection,
    pub volume_spike: bool,
    pub pivots: PivotLevels,
}
