// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend strength regardless of direction.
//
// Calculation pipeline (all smoothing is a plain rolling mean):
//   1. +DM = max(high_t - high_{t-1}, 0)
//      -DM = max(low_{t-1} - low_t, 0)
//   2. True Range per bar (see the ATR module).
//   3. ATR       = rolling mean of TR over `period`
//      +DI / -DI = 100 * rolling mean of +DM / -DM over `period`, over ATR
//   4. DX  = 100 * |+DI - -DI| / (+DI + -DI)
//   5. ADX = rolling mean of DX over `period`.
//
// Interpretation:
//   ADX >= 25 => trending market
//   ADX <  20 => ranging / choppy market
// =============================================================================

use crate::indicators::atr::true_ranges;
use crate::types::Bar;

/// Compute the most recent ADX value from a slice of OHLCV bars.
///
/// Returns `None` when:
/// - `period` is zero.
/// - There are fewer than `2 * period` bars (one `period` to fill the DI
///   window and another to fill the DX window behind it).
/// - Any intermediate calculation produces a non-finite result.
///
/// Division guards: a zero-range window yields DX = 0, and a window where
/// +DI + -DI = 0 also yields DX = 0. Neither propagates NaN.
pub fn last_adx(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < 2 * period {
        return None;
    }

    let n = bars.len();
    let tr = true_ranges(bars);

    // Directional movement per bar transition; dm[i] pairs with bar i + 1.
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        plus_dm.push((bars[i].high - bars[i - 1].high).max(0.0));
        minus_dm.push((bars[i - 1].low - bars[i].low).max(0.0));
    }

    let period_f = period as f64;

    // DX per bar, defined from bar index `period` (the first bar whose DM
    // window is full).
    let mut dx_values = Vec::with_capacity(n - period);
    for bar_idx in period..n {
        let dm_window = (bar_idx - period)..bar_idx; // dm indices, bars idx+1
        let avg_plus_dm = plus_dm[dm_window.clone()].iter().sum::<f64>() / period_f;
        let avg_minus_dm = minus_dm[dm_window].iter().sum::<f64>() / period_f;
        let avg_tr = tr[bar_idx + 1 - period..=bar_idx].iter().sum::<f64>() / period_f;

        let dx = compute_dx(avg_plus_dm, avg_minus_dm, avg_tr)?;
        dx_values.push(dx);
    }

    if dx_values.len() < period {
        return None;
    }

    // ADX at the last bar: rolling mean over the final `period` DX values.
    let adx = dx_values[dx_values.len() - period..].iter().sum::<f64>() / period_f;
    if adx.is_finite() {
        Some(adx)
    } else {
        None
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute DX from averaged +DM, -DM, and TR.
///
/// Returns `Some(0.0)` for zero-range and zero-DI-sum windows, `None` when
/// the result is non-finite.
fn compute_dx(avg_plus_dm: f64, avg_minus_dm: f64, avg_tr: f64) -> Option<f64> {
    if avg_tr == 0.0 {
        return Some(0.0);
    }

    let plus_di = (avg_plus_dm / avg_tr) * 100.0;
    let minus_di = (avg_minus_dm / avg_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        // No directional movement either way.
        return Some(0.0);
    }

    let dx = ((plus_di - minus_di).abs() / di_sum) * 100.0;
    if dx.is_finite() {
        Some(dx)
    } else {
        None
    }
}
