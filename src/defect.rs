//! Defect predictor (SPEC_FULL.md §4.12).
//!
//! Combines churn, complexity and ownership concentration into a ranking
//! signal. The absolute probability is not calibrated against a labeled
//! defect dataset; what the ranking order preserves is what matters here,
//! per SPEC_FULL.md §4.12.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DefectWeights {
    pub churn: f64,
    pub complexity: f64,
    pub ownership: f64,
}

impl Default for DefectWeights {
    fn default() -> Self {
        Self {
            churn: 0.4,
            complexity: 0.4,
            ownership: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRisk {
    pub path: PathBuf,
    pub probability: f64,
}

/// Per-file raw inputs: churn score (unbounded, recency-weighted), average
/// cognitive complexity, and the dominant owner's share of lines (0-1,
/// higher means more concentrated, hence riskier).
#[derive(Debug, Clone)]
pub struct FileSignals {
    pub path: PathBuf,
    pub churn_score: f64,
    pub avg_cognitive: f64,
    pub ownership_concentration: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Rank files by predicted defect probability, descending. Probabilities
/// are derived from min-max normalized signals combined linearly, then
/// squashed through a sigmoid centered at the midpoint (mirroring the
/// teacher's `defect_probability` ensemble's sigmoid-of-linear-combination
/// shape).
pub fn predict(signals: &[FileSignals], weights: &DefectWeights) -> Vec<FileRisk> {
    let max_churn = signals.iter().map(|s| s.churn_score).fold(0.0_f64, f64::max).max(f64::EPSILON);
    let max_cognitive = signals.iter().map(|s| s.avg_cognitive).fold(0.0_f64, f64::max).max(f64::EPSILON);

    let mut risks: Vec<FileRisk> = signals
        .iter()
        .map(|s| {
            let churn_norm = s.churn_score / max_churn;
            let complexity_norm = s.avg_cognitive / max_cognitive;
            let ownership_norm = s.ownership_concentration.clamp(0.0, 1.0);

            let raw = weights.churn * churn_norm + weights.complexity * complexity_norm + weights.ownership * ownership_norm;
            let probability = sigmoid(10.0 * (raw - 0.5));

            FileRisk {
                path: s.path.clone(),
                probability,
            }
        })
        .collect();

    risks.sort_by(|a, b| b.probability.partial_cmp(&a.probability).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.path.cmp(&b.path)));
    risks
}

/// Filter to files at or above `cutoff` (SPEC_FULL.md §4.12: "optionally
/// filters to high-risk only").
pub fn high_risk_only(risks: Vec<FileRisk>, cutoff: f64) -> Vec<FileRisk> {
    risks.into_iter().filter(|r| r.probability >= cutoff).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(path: &str, churn: f64, cognitive: f64, ownership: f64) -> FileSignals {
        FileSignals {
            path: PathBuf::from(path),
            churn_score: churn,
            avg_cognitive: cognitive,
            ownership_concentration: ownership,
        }
    }

    #[test]
    fn highest_signal_file_ranks_first() {
        let signals = vec![signal("quiet.rs", 0.1, 1.0, 0.2), signal("risky.rs", 5.0, 10.0, 0.9)];
        let ranked = predict(&signals, &DefectWeights::default());
        assert_eq!(ranked[0].path, PathBuf::from("risky.rs"));
    }

    #[test]
    fn high_risk_filter_drops_low_probability_files() {
        let signals = vec![signal("quiet.rs", 0.1, 0.5, 0.1), signal("risky.rs", 5.0, 10.0, 0.9)];
        let ranked = predict(&signals, &DefectWeights::default());
        let filtered = high_risk_only(ranked, 0.6);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, PathBuf::from("risky.rs"));
    }

    #[test]
    fn probabilities_stay_within_unit_interval() {
        let signals = vec![signal("a.rs", 100.0, 50.0, 1.0)];
        let ranked = predict(&signals, &DefectWeights::default());
        assert!(ranked[0].probability >= 0.0 && ranked[0].probability <= 1.0);
    }
}
