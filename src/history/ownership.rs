//! Ownership analyzer (SPEC_FULL.md §4.11).

use crate::model::commit::FileBlame;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct OwnershipConfig {
    pub silo_threshold: f64,
    pub bus_factor_threshold: f64,
    pub exclude_trivial_lines: bool,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            silo_threshold: 0.75,
            bus_factor_threshold: 0.80,
            exclude_trivial_lines: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOwnership {
    pub dominant_author: String,
    pub dominant_share: f64,
    pub is_knowledge_silo: bool,
    pub bus_factor: usize,
}

fn is_trivial(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
}

pub fn compute(blame: &FileBlame, config: &OwnershipConfig) -> Option<FileOwnership> {
    let lines: Vec<&crate::model::commit::BlameLine> = blame
        .lines
        .iter()
        .filter(|l| !config.exclude_trivial_lines || !is_trivial(&l.text))
        .collect();

    let total = lines.len();
    if total == 0 {
        return None;
    }

    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for line in &lines {
        *counts.entry(line.author.as_str()).or_insert(0) += 1;
    }
    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let (dominant_author, dominant_count) = sorted[0];
    let dominant_share = dominant_count as f64 / total as f64;

    let mut covered = 0usize;
    let mut bus_factor = 0usize;
    for (_, count) in &sorted {
        if covered as f64 / total as f64 >= config.bus_factor_threshold {
            break;
        }
        covered += count;
        bus_factor += 1;
    }

    Some(FileOwnership {
        dominant_author: dominant_author.to_string(),
        dominant_share,
        is_knowledge_silo: dominant_share > config.silo_threshold,
        bus_factor: bus_factor.max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::commit::BlameLine;

    fn blame(lines: &[(&str, &str)]) -> FileBlame {
        FileBlame {
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, (author, text))| BlameLine {
                    line: i as u32 + 1,
                    author: author.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn single_author_file_is_a_knowledge_silo() {
        let b = blame(&[("alice", "a"), ("alice", "b"), ("alice", "c")]);
        let ownership = compute(&b, &OwnershipConfig::default()).unwrap();
        assert!(ownership.is_knowledge_silo);
        assert_eq!(ownership.bus_factor, 1);
    }

    #[test]
    fn evenly_shared_file_is_not_a_silo() {
        let b = blame(&[("alice", "a"), ("bob", "b"), ("carol", "c"), ("dave", "d")]);
        let ownership = compute(&b, &OwnershipConfig::default()).unwrap();
        assert!(!ownership.is_knowledge_silo);
        assert!(ownership.bus_factor >= 2);
    }

    #[test]
    fn blank_lines_are_excluded_by_default() {
        let b = blame(&[("alice", ""), ("alice", "real code"), ("bob", "// comment")]);
        let ownership = compute(&b, &OwnershipConfig::default()).unwrap();
        assert_eq!(ownership.dominant_author, "alice");
        assert_eq!(ownership.dominant_share, 1.0);
    }

    #[test]
    fn empty_blame_yields_no_ownership() {
        let b = FileBlame::default();
        assert!(compute(&b, &OwnershipConfig::default()).is_none());
    }
}
