// =============================================================================
// Volume Spike Detector
// =============================================================================
//
// Compares the most recent `lookback` bars against the average volume of the
// `baseline_window` bars immediately before them. Any single recent bar above
// baseline * multiplier counts as a spike.
// =============================================================================

/// Detect a volume spike in the most recent bars.
///
/// Returns `false` (not an error) when the series is shorter than
/// `lookback + baseline_window` or the baseline cannot be formed.
pub fn volume_spike(
    volumes: &[f64],
    lookback: usize,
    baseline_window: usize,
    multiplier: f64,
) -> bool {
    if lookback == 0 || baseline_window == 0 {
        return false;
    }
    if volumes.len() < lookback + baseline_window {
        return false;
    }

    let recent_start = volumes.len() - lookback;
    let baseline_start = recent_start - baseline_window;

    let baseline: f64 =
        volumes[baseline_start..recent_start].iter().sum::<f64>() / baseline_window as f64;
    if !baseline.is_finite() {
        return false;
    }

    let threshold = baseline * multiplier;
    volumes[recent_start..].iter().any(|&v| v > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_short_series_is_false() {
        // lookback 5 + baseline 5 => anything up to 9 bars can never spike.
        for n in 0..10 {
            let volumes = vec![1000.0; n];
            assert!(!volume_spike(&volumes, 5, 5, 1.2));
        }
    }

    #[test]
    fn spike_flat_volume_is_false() {
        let volumes = vec![1000.0; 20];
        assert!(!volume_spike(&volumes, 5, 5, 1.2));
    }

    #[test]
    fn spike_single_recent_bar_triggers() {
        // Baseline = 1000; one recent bar at 1300 > 1200 threshold.
        let mut volumes = vec![1000.0; 10];
        volumes[7] = 1300.0;
        assert!(volume_spike(&volumes, 5, 5, 1.2));
    }

    #[test]
    fn spike_in_baseline_does_not_trigger() {
        // A burst inside the baseline window raises the threshold instead.
        let mut volumes = vec![1000.0; 10];
        volumes[2] = 5000.0;
        assert!(!volume_spike(&volumes, 5, 5, 1.2));
    }

    #[test]
    fn spike_exact_threshold_is_not_a_spike() {
        // Strictly-greater comparison: exactly baseline * multiplier fails.
        let mut volumes = vec![1000.0; 10];
        volumes[9] = 1200.0;
        assert!(!volume_spike(&volumes, 5, 5, 1.2));
    }

    #[test]
    fn spike_zero_windows_are_false() {
        let volumes = vec![1000.0; 20];
        assert!(!volume_spike(&volumes, 0, 5, 1.2));
        assert!(!volume_spike(&volumes, 5, 0, 1.2));
    }
}
