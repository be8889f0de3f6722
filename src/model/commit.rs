//! Commit / blame value types (SPEC_FULL.md §3, §4.11, §6).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone)]
pub struct BlameLine {
    pub line: u32,
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct FileBlame {
    pub lines: Vec<BlameLine>,
}

impl FileBlame {
    /// Per-author line counts, descending by count.
    pub fn line_counts_by_author(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for line in &self.lines {
            *counts.entry(line.author.clone()).or_insert(0) += 1;
        }
        let mut out: Vec<(String, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}
