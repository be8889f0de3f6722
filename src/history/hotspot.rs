//! Hotspot ranking (SPEC_FULL.md §4.11): churn × average cognitive
//! complexity, normalized, sorted descending.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotEntry {
    pub path: PathBuf,
    pub churn_score: f64,
    pub avg_cognitive: f64,
    pub hotspot_score: f64,
}

/// Sort `(path, churn_score, avg_cognitive)` by normalized `churn * complexity`.
pub fn rank(entries: Vec<(PathBuf, f64, f64)>) -> Vec<HotspotEntry> {
    let max_churn = entries.iter().map(|(_, c, _)| *c).fold(0.0_f64, f64::max).max(f64::EPSILON);
    let max_cognitive = entries.iter().map(|(_, _, c)| *c).fold(0.0_f64, f64::max).max(f64::EPSILON);

    let mut ranked: Vec<HotspotEntry> = entries
        .into_iter()
        .map(|(path, churn_score, avg_cognitive)| {
            let normalized_churn = churn_score / max_churn;
            let normalized_cognitive = avg_cognitive / max_cognitive;
            HotspotEntry {
                path,
                churn_score,
                avg_cognitive,
                hotspot_score: normalized_churn * normalized_cognitive,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.hotspot_score.partial_cmp(&a.hotspot_score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_churn_and_complexity_file_ranks_first() {
        let entries = vec![
            (PathBuf::from("quiet.rs"), 1.0, 1.0),
            (PathBuf::from("hot.rs"), 10.0, 10.0),
            (PathBuf::from("medium.rs"), 5.0, 3.0),
        ];
        let ranked = rank(entries);
        assert_eq!(ranked[0].path, PathBuf::from("hot.rs"));
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        assert!(rank(Vec::new()).is_empty());
    }
}
