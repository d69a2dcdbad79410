// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
// MACD line   = EMA(close, fast) - EMA(close, slow)
// Signal line = EMA(MACD line, signal)
//
// Standard parameters: fast = 12, slow = 26, signal = 9.
// =============================================================================

use crate::indicators::ema::ema;

/// MACD line and signal line, both one value per input close.
#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute the MACD line and signal line for `closes`.
///
/// Both series have the same length as the input (the underlying EMAs are
/// seeded from the first value). Returns an empty `Macd` when any period is
/// zero or the input is empty.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    if fast == 0 || slow == 0 || signal == 0 || closes.is_empty() {
        return Macd::default();
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    if ema_fast.len() != closes.len() || ema_slow.len() != closes.len() {
        // A truncated EMA means non-finite input; don't produce a partial MACD.
        return Macd::default();
    }

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal);

    Macd { line, signal }
}

/// Last MACD line and signal values with the standard 12/26/9 parameters.
pub fn last_macd(closes: &[f64]) -> Option<(f64, f64)> {
    let out = macd(closes, 12, 26, 9);
    match (out.line.last(), out.signal.last()) {
        (Some(&l), Some(&s)) if l.is_finite() && s.is_finite() => Some((l, s)),
        _ => None,
    }
}
