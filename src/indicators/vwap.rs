// =============================================================================
// Volume-Weighted Average Price (VWAP)
// =============================================================================
//
// Typical price per bar: (high + low + close) / 3.
// VWAP_t = cumsum(tp * volume)[0..=t] / cumsum(volume)[0..=t]
//
// This is the running, from-window-start VWAP, not a rolling one: the value
// depends on where the fetched window begins.
// =============================================================================

use crate::types::Bar;

/// Compute the running VWAP series, one value per bar.
///
/// While cumulative volume is still zero the typical price itself is used, so
/// the series never divides by zero.
pub fn vwap(bars: &[Bar]) -> Vec<f64> {
    let mut cum_pv = 0.0_f64;
    let mut cum_vol = 0.0_f64;

    let mut result = Vec::with_capacity(bars.len());
    for bar in bars {
        let tp = (bar.high + bar.low + bar.close) / 3.0;
        cum_pv += tp * bar.volume;
        cum_vol += bar.volume;

        if cum_vol > 0.0 {
            result.push(cum_pv / cum_vol);
        } else {
            result.push(tp);
        }
    }

    result
}

/// Most recent VWAP value, or `None` for an empty or broken series.
pub fn last_vwap(bars: &[Bar]) -> Option<f64> {
    vwap(bars).last().copied().filter(|v| v.is_finite())
}
