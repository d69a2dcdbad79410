// =============================================================================
// Supertrend — ATR band with directional hysteresis
// =============================================================================
//
// Bands per bar (once ATR is defined):
//   hl2   = (high + low) / 2
//   upper = hl2 + multiplier * ATR
//   lower = hl2 - multiplier * ATR
//
// The supertrend value is a sequential recurrence over bars, not a per-bar
// formula. The first band-bearing bar takes the upper band with a bullish
// direction; after that:
//
//   close > prev supertrend  => direction becomes bullish
//   close < prev supertrend  => direction becomes bearish
//   close == prev supertrend => direction unchanged (hysteresis)
//
//   supertrend = lower band when bullish, upper band when bearish
//
// Because each value depends on the previous supertrend value, the fold must
// run strictly in bar order.
// =============================================================================

use crate::indicators::atr::atr;
use crate::types::{Bar, TrendDirection};

/// Supertrend value and direction at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupertrendPoint {
    pub value: f64,
    pub direction: TrendDirection,
}

/// Compute the supertrend series.
///
/// The output holds one point per bar starting at index `period - 1` (the
/// first bar with a defined ATR). Returns an empty vec when `period` is zero
/// or there are fewer than `period` bars.
pub fn supertrend_series(bars: &[Bar], period: usize, multiplier: f64) -> Vec<SupertrendPoint> {
    let atr_series = atr(bars, period);
    if atr_series.is_empty() {
        return Vec::new();
    }

    let start = period - 1;
    let mut result: Vec<SupertrendPoint> = Vec::with_capacity(atr_series.len());
    let mut direction = TrendDirection::Bullish;

    for (offset, band_atr) in atr_series.iter().enumerate() {
        let bar = &bars[start + offset];
        let hl2 = (bar.high + bar.low) / 2.0;
        let upper = hl2 + multiplier * band_atr;
        let lower = hl2 - multiplier * band_atr;

        let value = if offset == 0 {
            // Seed bar: upper band, bullish.
            upper
        } else {
            let prev = result[offset - 1].value;
            if bar.close > prev {
                direction = TrendDirection::Bullish;
            } else if bar.close < prev {
                direction = TrendDirection::Bearish;
            }
            match direction {
                TrendDirection::Bullish => lower,
                TrendDirection::Bearish => upper,
            }
        };

        result.push(SupertrendPoint { value, direction });
    }

    result
}

/// Supertrend at the most recent bar.
pub fn last_supertrend(bars: &[Bar], period: usize, multiplier: f64) -> Option<SupertrendPoint> {
    supertrend_series(bars, period, multiplier)
        .last()
        .copied()
        .filter(|p| p.value.is_finite())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: 0,
            open: close,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    fn flat(n: usize) -> Vec<Bar> {
        vec![bar(101.0, 99.0, 100.0); n]
    }

    #[test]
    fn supertrend_insufficient_data() {
        assert!(supertrend_series(&flat(5), 10, 3.0).is_empty());
        assert!(last_supertrend(&flat(5), 10, 3.0).is_none());
    }

    #[test]
    fn supertrend_seed_is_upper_band() {
        // Flat bars: ATR = 2, hl2 = 100, so the seed value is 100 + 3*2 = 106.
        let series = supertrend_series(&flat(2), 2, 3.0);
        assert_eq!(series.len(), 1);
        assert!((series[0].value - 106.0).abs() < 1e-10);
        assert_eq!(series[0].direction, TrendDirection::Bullish);
    }

    #[test]
    fn supertrend_flat_market_turns_bearish_after_seed() {
        // After seeding at the upper band, a flat close sits below it, so the
        // direction flips bearish and stays on the upper band.
        let series = supertrend_series(&flat(10), 2, 3.0);
        for point in &series[1..] {
            assert_eq!(point.direction, TrendDirection::Bearish);
            assert!((point.value - 106.0).abs() < 1e-10);
        }
    }

    #[test]
    fn supertrend_breakout_flips_bullish_onto_lower_band() {
        let mut bars = flat(5);
        // Close far above the previous supertrend (106).
        bars.push(bar(121.0, 119.0, 120.0));
        let series = supertrend_series(&bars, 2, 3.0);
        let last = series.last().unwrap();
        assert_eq!(last.direction, TrendDirection::Bullish);
        // Bullish bars ride the lower band, which sits below price.
        assert!(last.value < 120.0);
    }

    #[test]
    fn supertrend_equal_close_keeps_direction() {
        // Build one more bar whose close lands exactly on the previous
        // supertrend value: the direction must not change.
        let mut bars = flat(10);
        let prev = *supertrend_series(&bars, 2, 3.0).last().unwrap();
        bars.push(bar(prev.value + 1.0, prev.value - 1.0, prev.value));
        let series = supertrend_series(&bars, 2, 3.0);
        assert_eq!(series.last().unwrap().direction, prev.direction);
    }

    #[test]
    fn supertrend_flip_requires_close_through_band() {
        // Once bullish at bar i, bar i+1 can only turn bearish when its close
        // drops below the bar-i supertrend value.
        let mut bars = flat(5);
        bars.push(bar(121.0, 119.0, 120.0));
        for i in 0..20 {
            let c = 120.0 + ((i * 7) % 5) as f64 - 2.0; // small wiggle
            bars.push(bar(c + 1.0, c - 1.0, c));
        }
        let series = supertrend_series(&bars, 2, 3.0);
        for pair in series.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            if prev.direction == TrendDirection::Bullish
                && cur.direction == TrendDirection::Bearish
            {
                // The flip bar's close must have crossed below prev value.
                // Recover the close from the fold inputs is awkward here, so
                // assert the weaker invariant directly: a bearish bar quotes
                // the upper band, which sits above the previous value.
                assert!(cur.value > prev.value);
            }
        }
    }

    #[test]
    fn supertrend_sequential_fold_is_deterministic() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.4).sin() * 8.0;
                bar(c + 1.0, c - 1.0, c)
            })
            .collect();
        let a = supertrend_series(&bars, 10, 3.0);
        let b = supertrend_series(&bars, 10, 3.0);
        assert_eq!(a, b);
    }
}
