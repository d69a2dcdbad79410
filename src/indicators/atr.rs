// =============================================================================
// Average True Range (ATR) — Rolling-Mean Method
// =============================================================================
//
// True Range (TR) per bar:
//   TR_0 = H_0 - L_0                      (no previous close yet)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the plain rolling mean of TR over `period` bars. The first ATR value
// therefore corresponds to bar index `period - 1`.
// =============================================================================

use crate::types::Bar;

/// Compute the rolling-mean ATR series.
///
/// The returned vector holds one value per bar starting at index
/// `period - 1`; `out[i]` is the ATR at bar `i + period - 1`.
///
/// # Edge cases
/// - `period == 0` or `bars.len() < period` => empty vec
/// - Non-finite true ranges truncate the series.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    let tr = true_ranges(bars);
    let period_f = period as f64;

    let mut result = Vec::with_capacity(tr.len() - period + 1);
    for window in tr.windows(period) {
        let mean = window.iter().sum::<f64>() / period_f;
        if !mean.is_finite() {
            break;
        }
        result.push(mean);
    }

    result
}

/// True Range for every bar. The first bar has no previous close, so its TR
/// collapses to the plain high-low range.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if i == 0 {
            bar.high - bar.low
        } else {
            let prev_close = bars[i - 1].close;
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        };
        tr.push(value);
    }

    tr
}
