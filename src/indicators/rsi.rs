// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Mean
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an instrument is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gains (negative deltas clipped to 0) and losses
//          (positive deltas clipped to 0, then absolute value).
// Step 3 — Average gain / average loss = plain rolling mean over `period`
//          bars (no exponential smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first `period` closes have no RSI (the rolling window is not full yet).
// =============================================================================

/// Compute the RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` closes are consumed by the rolling window).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need `period` deltas)
/// - Zero average loss with gains present saturates RSI to 100.0 instead of
///   dividing by zero.
/// - A completely flat window (no gains, no losses) is reported as 50.0.
/// - Non-finite results stop the series; the output is truncated.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);

    // Rolling mean over each full window of `period` deltas.
    for window in deltas.windows(period) {
        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l + d.abs())
            }
        });

        match rsi_from_averages(sum_gain / period_f, sum_loss / period_f) {
            Some(value) => result.push(value),
            None => break, // Non-finite — stop producing values.
        }
    }

    result
}

/// Most recent RSI value, or `None` on insufficient or broken data.
pub fn last_rsi(closes: &[f64], period: usize) -> Option<f64> {
    rsi(closes, period).last().copied()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let value = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
