//! Temporal coupling analyzer (SPEC_FULL.md §4.11).

use crate::model::commit::CommitRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoupledPair {
    pub a: PathBuf,
    pub b: PathBuf,
    pub cochanges: usize,
}

fn pair_key(a: &PathBuf, b: &PathBuf) -> (PathBuf, PathBuf) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

pub fn compute(commits: &[CommitRecord], min_cochanges: usize) -> Vec<CoupledPair> {
    let mut counts: HashMap<(PathBuf, PathBuf), usize> = HashMap::new();

    for commit in commits {
        if commit.files.len() < 2 {
            continue;
        }
        for i in 0..commit.files.len() {
            for j in i + 1..commit.files.len() {
                let key = pair_key(&commit.files[i].path, &commit.files[j].path);
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<CoupledPair> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_cochanges)
        .map(|((a, b), cochanges)| CoupledPair { a, b, cochanges })
        .collect();
    pairs.sort_by(|x, y| y.cochanges.cmp(&x.cochanges));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::commit::FileChange;
    use chrono::Utc;

    fn commit(paths: &[&str]) -> CommitRecord {
        CommitRecord {
            hash: "h".to_string(),
            author: "a".to_string(),
            timestamp: Utc::now(),
            message: "m".to_string(),
            files: paths
                .iter()
                .map(|p| FileChange {
                    path: PathBuf::from(p),
                    additions: 1,
                    deletions: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn pair_below_threshold_is_dropped() {
        let commits = vec![commit(&["a.rs", "b.rs"])];
        assert!(compute(&commits, 3).is_empty());
    }

    #[test]
    fn pair_meeting_threshold_is_reported_once() {
        let commits = vec![
            commit(&["a.rs", "b.rs"]),
            commit(&["b.rs", "a.rs"]),
            commit(&["a.rs", "b.rs"]),
        ];
        let pairs = compute(&commits, 3);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cochanges, 3);
    }

    #[test]
    fn single_file_commits_contribute_no_pairs() {
        let commits = vec![commit(&["a.rs"])];
        assert!(compute(&commits, 1).is_empty());
    }
}
