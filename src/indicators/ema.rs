// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (period + 1)
//   EMA_0 = value_0
//   EMA_t = value_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is seeded with the first input value, so the output has one EMA
// per input bar with no warm-up gap.
// =============================================================================

/// Compute the EMA series for the given `values` slice and look-back `period`.
///
/// The output is the same length as the input: `out[i]` is the EMA at bar `i`.
///
/// # Edge cases
/// - `period == 0` or empty input => empty vec
/// - A non-finite value poisons the recursion, so the series is truncated at
///   the first non-finite result. Downstream consumers should not trust a
///   broken series.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    if !prev.is_finite() {
        return Vec::new();
    }
    result.push(prev);

    for &value in &values[1..] {
        let next = value * alpha + prev * (1.0 - alpha);
        if !next.is_finite() {
            break;
        }
        result.push(next);
        prev = next;
    }

    result
}

/// Most recent EMA value, or `None` when the series cannot be computed.
pub fn last_ema(values: &[f64], period: usize) -> Option<f64> {
    // The full series must cover every bar; a truncated series means a
    // non-finite value crept in and the last bar is untrustworthy.
    let series = ema(values, period);
    if series.len() != values.len() {
        return None;
    }
    series.last().copied()
}
