// =============================================================================
// Floor Pivots + Central Pivot Range (CPR)
// =============================================================================
//
//   P  = (H + L + C) / 3
//   R1 = 2P - L        S1 = 2P - H
//   R2 = P + (H - L)   S2 = P - (H - L)
//   CPR top    = (P + R1) / 2
//   CPR bottom = (P + S1) / 2
// =============================================================================

use serde::{Deserialize, Serialize};

/// Classic floor-pivot levels with the CPR band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
    pub cpr_top: f64,
    pub cpr_bottom: f64,
}

/// Compute pivot levels from a reference bar's high, low, and close.
pub fn pivot_levels(high: f64, low: f64, close: f64) -> PivotLevels {
    let pivot = (high + low + close) / 3.0;
    let r1 = 2.0 * pivot - low;
    let s1 = 2.0 * pivot - high;

    PivotLevels {
        pivot,
        r1,
        r2: pivot + (high - low),
        s1,
        s2: pivot - (high - low),
        cpr_top: (pivot + r1) / 2.0,
        cpr_bottom: (pivot + s1) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_identities() {
        let p = pivot_levels(110.0, 90.0, 100.0);
        assert!((p.pivot - 100.0).abs() < 1e-10);
        assert!((p.r1 - 110.0).abs() < 1e-10);
        assert!((p.s1 - 90.0).abs() < 1e-10);
        assert!((p.r2 - 120.0).abs() < 1e-10);
        assert!((p.s2 - 80.0).abs() < 1e-10);
        assert!((p.cpr_top - 105.0).abs() < 1e-10);
        assert!((p.cpr_bottom - 95.0).abs() < 1e-10);
    }

    #[test]
    fn pivot_levels_are_ordered() {
        let p = pivot_levels(523.4, 508.1, 517.9);
        assert!(p.s2 < p.s1);
        assert!(p.s1 < p.pivot);
        assert!(p.pivot < p.r1);
        assert!(p.r1 < p.r2);
        assert!(p.cpr_bottom < p.pivot && p.pivot < p.cpr_top);
    }
}
