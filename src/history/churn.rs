//! Churn analyzer (SPEC_FULL.md §4.11).

use crate::model::commit::CommitRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileChurn {
    pub path: PathBuf,
    pub commits: usize,
    pub authors: usize,
    pub additions: usize,
    pub deletions: usize,
    /// Commits weighted by recency: `sum(1 / (1 + days_ago))`.
    pub churn_score: f64,
}

pub fn compute(commits: &[CommitRecord]) -> Vec<FileChurn> {
    let now = Utc::now();
    let mut by_file: HashMap<PathBuf, (usize, HashSet<String>, usize, usize, f64)> = HashMap::new();

    for commit in commits {
        let days_ago = (now - commit.timestamp).num_days().max(0) as f64;
        let recency_weight = 1.0 / (1.0 + days_ago);
        for file in &commit.files {
            let entry = by_file.entry(file.path.clone()).or_insert((0, HashSet::new(), 0, 0, 0.0));
            entry.0 += 1;
            entry.1.insert(commit.author.clone());
            entry.2 += file.additions;
            entry.3 += file.deletions;
            entry.4 += recency_weight;
        }
    }

    let mut result: Vec<FileChurn> = by_file
        .into_iter()
        .map(|(path, (commits, authors, additions, deletions, churn_score))| FileChurn {
            path,
            commits,
            authors: authors.len(),
            additions,
            deletions,
            churn_score,
        })
        .collect();
    result.sort_by(|a, b| b.churn_score.partial_cmp(&a.churn_score).unwrap_or(std::cmp::Ordering::Equal));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::commit::FileChange;
    use chrono::{Duration, Utc};

    fn commit(author: &str, days_ago: i64, path: &str, additions: usize) -> CommitRecord {
        CommitRecord {
            hash: format!("h{days_ago}{author}"),
            author: author.to_string(),
            timestamp: Utc::now() - Duration::days(days_ago),
            message: "m".to_string(),
            files: vec![FileChange {
                path: PathBuf::from(path),
                additions,
                deletions: 0,
            }],
        }
    }

    #[test]
    fn more_recent_commits_contribute_more_churn() {
        let recent = compute(&[commit("a", 1, "x.rs", 1)]);
        let old = compute(&[commit("a", 100, "x.rs", 1)]);
        assert!(recent[0].churn_score > old[0].churn_score);
    }

    #[test]
    fn distinct_authors_are_counted_once_each() {
        let commits = vec![commit("a", 1, "x.rs", 1), commit("a", 2, "x.rs", 1), commit("b", 3, "x.rs", 1)];
        let churn = compute(&commits);
        assert_eq!(churn[0].authors, 2);
        assert_eq!(churn[0].commits, 3);
    }
}
