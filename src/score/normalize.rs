//! Fixed normalization curves, one per component (SPEC_FULL.md §4.13).
//!
//! Each function returns an integer in `[0, 100]`; higher is always better.
//! All curves are monotone non-increasing in their "badness" input, which
//! is what the §8 duplication-monotonicity invariant exercises directly
//! against [`duplication`].

/// `100 * (1 - violating / total)`. `total = 0` (no functions analyzed)
/// scores a perfect 100 rather than dividing by zero.
pub fn complexity(violating: usize, total: usize) -> i32 {
    if total == 0 {
        return 100;
    }
    let ratio = violating as f64 / total as f64;
    (100.0 * (1.0 - ratio)).round().clamp(0.0, 100.0) as i32
}

/// Piecewise-linear on duplication ratio (SPEC_FULL.md §4.13 table):
/// 0-3% -> 100-95; 3-5% -> 95-90; 5-10% -> 90-80; 10-20% -> 80-60;
/// >20% -> 60-0 (floors at 0).
pub fn duplication(ratio: f64) -> i32 {
    let pct = (ratio * 100.0).clamp(0.0, 100.0);
    let score = if pct <= 3.0 {
        100.0 - (pct / 3.0) * 5.0
    } else if pct <= 5.0 {
        95.0 - ((pct - 3.0) / 2.0) * 5.0
    } else if pct <= 10.0 {
        90.0 - ((pct - 5.0) / 5.0) * 10.0
    } else if pct <= 20.0 {
        80.0 - ((pct - 10.0) / 10.0) * 20.0
    } else {
        (60.0 - ((pct - 20.0) / 80.0) * 60.0).max(0.0)
    };
    score.round().clamp(0.0, 100.0) as i32
}

/// `100 - weighted_per_kloc * 2`, clamped. `weighted_per_kloc` is the sum
/// of SATD marker severity weights per 1000 lines of code.
pub fn satd(weighted_per_kloc: f64) -> i32 {
    (100.0 - weighted_per_kloc * 2.0).round().clamp(0.0, 100.0) as i32
}

/// Coupling score: baseline `100 - 50 * average_instability`, with further
/// deductions (each capped) for cyclic and SDP-violating components per
/// 100 components analyzed. Returns 75 when no components were analyzed.
pub fn coupling(average_instability: f64, cycle_components: usize, sdp_violations: usize, total_components: usize) -> i32 {
    if total_components == 0 {
        return 75;
    }
    let baseline = 100.0 - 50.0 * average_instability.clamp(0.0, 1.0);
    let cycle_per_100 = (cycle_components as f64 / total_components as f64) * 100.0;
    let sdp_per_100 = (sdp_violations as f64 / total_components as f64) * 100.0;
    let cycle_penalty = cycle_per_100.min(50.0);
    let sdp_penalty = sdp_per_100.min(30.0);
    (baseline - cycle_penalty - sdp_penalty).round().clamp(0.0, 100.0) as i32
}

/// `100 - 10 * (weighted_smells / total_components) * 10`, weights
/// {critical: 3, high: 2, medium: 1}.
pub fn smells(weighted_smells: f64, total_components: usize) -> i32 {
    if total_components == 0 {
        return 100;
    }
    let ratio = weighted_smells / total_components as f64;
    (100.0 - 10.0 * ratio * 10.0).round().clamp(0.0, 100.0) as i32
}

/// `100` when `avg_lcom4 <= 1`; else `100 - (avg_lcom4 - 1) * 11.1`,
/// clamped. SPEC_FULL.md §8: "LCOM4 = 1 => cohesion = 100; LCOM4 >= 10 =>
/// cohesion = 0."
pub fn cohesion(avg_lcom4: f64) -> i32 {
    if avg_lcom4 <= 1.0 {
        return 100;
    }
    (100.0 - (avg_lcom4 - 1.0) * 11.1).round().clamp(0.0, 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplication_ratio_zero_scores_one_hundred() {
        assert_eq!(duplication(0.0), 100);
    }

    #[test]
    fn duplication_ratio_one_scores_zero() {
        assert_eq!(duplication(1.0), 0);
    }

    #[test]
    fn duplication_is_monotone_non_increasing() {
        let samples = [0.0, 0.02, 0.04, 0.08, 0.15, 0.3, 0.6, 1.0];
        for pair in samples.windows(2) {
            assert!(duplication(pair[0]) >= duplication(pair[1]));
        }
    }

    #[test]
    fn cohesion_boundary_values_match_spec() {
        assert_eq!(cohesion(1.0), 100);
        assert_eq!(cohesion(10.0), 0);
    }

    #[test]
    fn no_components_analyzed_yields_neutral_coupling_score() {
        assert_eq!(coupling(0.0, 0, 0, 0), 75);
    }

    #[test]
    fn complexity_with_no_functions_is_perfect() {
        assert_eq!(complexity(0, 0), 100);
    }
}
