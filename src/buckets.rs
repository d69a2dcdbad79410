// =============================================================================
// Momentum Buckets — regime classification per symbol
// =============================================================================
//
// Two classification strategies share one bucket enumeration:
//
//   MultiIndicator — ordered cascade over RSI, EMA stack, VWAP, and ADX.
//     Rule order is part of the contract: each rule's condition implicitly
//     excludes the stricter rules evaluated before it. First match wins,
//     falling through to Neutral.
//
//   RsiOnly — single-threshold reduction over RSI alone. Lower bounds are
//     inclusive, so RSI exactly 45.0 lands in BearishTrend, exactly 55.0 in
//     BullishTrend.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::IndicatorSnapshot;

/// The seven mutually exclusive momentum buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    ExtremeBought,
    Overbought,
    BullishTrend,
    BearishTrend,
    Oversold,
    ExtremeSold,
    Neutral,
}

impl Bucket {
    /// Fixed presentation order, hottest first.
    pub const DISPLAY_ORDER: [Bucket; 7] = [
        Bucket::ExtremeBought,
        Bucket::Overbought,
        Bucket::BullishTrend,
        Bucket::BearishTrend,
        Bucket::Oversold,
        Bucket::ExtremeSold,
        Bucket::Neutral,
    ];
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ExtremeBought => "Extreme Bought",
            Self::Overbought => "Overbought",
            Self::BullishTrend => "Bullish Trend",
            Self::BearishTrend => "Bearish Trend",
            Self::Oversold => "Oversold",
            Self::ExtremeSold => "Extreme Sold",
            Self::Neutral => "Neutral",
        };
        write!(f, "{label}")
    }
}

/// Which classification strategy a scan should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    MultiIndicator,
    RsiOnly,
}

impl Default for ClassifierStrategy {
    fn default() -> Self {
        Self::MultiIndicator
    }
}

/// Classify a snapshot into its bucket with the chosen strategy.
///
/// Total and deterministic: every snapshot maps to exactly one bucket, and a
/// non-finite RSI (which should not survive the scanner, but the classifier
/// does not get to assume that) maps to Neutral.
pub fn classify(snap: &IndicatorSnapshot, strategy: ClassifierStrategy) -> Bucket {
    if !snap.rsi.is_finite() {
        return Bucket::Neutral;
    }
    match strategy {
        ClassifierStrategy::MultiIndicator => classify_cascade(snap),
        ClassifierStrategy::RsiOnly => classify_rsi_only(snap.rsi),
    }
}

/// The full multi-indicator cascade. Evaluation order matters.
fn classify_cascade(snap: &IndicatorSnapshot) -> Bucket {
    let rsi = snap.rsi;
    let price = snap.last_price;

    if rsi >= 80.0 && price > snap.vwap && snap.adx >= 25.0 {
        return Bucket::ExtremeBought;
    }

    if (70.0..80.0).contains(&rsi) && price > snap.ema9 && snap.adx >= 20.0 {
        return Bucket::Overbought;
    }

    if (55.0..70.0).contains(&rsi)
        && snap.ema9 > snap.ema26
        && snap.ema26 > snap.ema50
        && price > snap.vwap
    {
        return Bucket::BullishTrend;
    }

    if rsi > 30.0
        && rsi <= 45.0
        && snap.ema9 < snap.ema26
        && snap.ema26 < snap.ema50
        && price < snap.vwap
    {
        return Bucket::BearishTrend;
    }

    if rsi > 20.0 && rsi <= 30.0 {
        return Bucket::Oversold;
    }

    if rsi <= 20.0 {
        return Bucket::ExtremeSold;
    }

    Bucket::Neutral
}

/// RSI-only reduction used by the quick scan mode.
fn classify_rsi_only(rsi: f64) -> Bucket {
    if rsi >= 80.0 {
        Bucket::ExtremeBought
    } else if rsi >= 70.0 {
        Bucket::Overbought
    } else if rsi >= 55.0 {
        Bucket::BullishTrend
    } else if rsi >= 45.0 {
        Bucket::BearishTrend
    } else if rsi >= 30.0 {
        Bucket::Oversold
    } else {
        Bucket::ExtremeSold
    }
}

// =============================================================================
// RSI level crosses + index direction gauge
// =============================================================================

/// An RSI level cross between the previous bar and the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiCross {
    Above30,
    Above50,
    Below50,
    Below70,
}

impl std::fmt::Display for RsiCross {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above30 => write!(f, "crossed above 30"),
            Self::Above50 => write!(f, "crossed above 50"),
            Self::Below50 => write!(f, "crossed below 50"),
            Self::Below70 => write!(f, "crossed below 70"),
        }
    }
}

/// Detect an RSI level cross between two consecutive readings.
///
/// Checked upward first (30 before 50), then downward (70 before 50), so a
/// large jump reports the outermost level it cleared.
pub fn rsi_cross(prev: f64, now: f64) -> Option<RsiCross> {
    if prev < 30.0 && now >= 30.0 {
        return Some(RsiCross::Above30);
    }
    if prev < 50.0 && now >= 50.0 {
        return Some(RsiCross::Above50);
    }
    if prev > 70.0 && now <= 70.0 {
        return Some(RsiCross::Below70);
    }
    if prev > 50.0 && now <= 50.0 {
        return Some(RsiCross::Below50);
    }
    None
}

/// Broad-market direction from an index RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for MarketDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Map an index RSI to a direction: > 55 bullish, < 45 bearish, else neutral.
pub fn market_direction(rsi: f64) -> MarketDirection {
    if rsi > 55.0 {
        MarketDirection::Bullish
    } else if rsi < 45.0 {
        MarketDirection::Bearish
    } else {
        MarketDirection::Neutral
    }
}
