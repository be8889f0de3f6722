//! Clone/duplicate value types (SPEC_FULL.md §3, §4.5).

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum CloneType {
    Type1,
    Type2,
    Type3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFragment {
    pub file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub token_count: usize,
}

#[derive(Debug, Clone)]
pub struct CloneGroup {
    pub clone_type: CloneType,
    pub fragments: Vec<CodeFragment>,
    /// Minimum pairwise Jaccard estimate observed among members.
    pub min_similarity: f64,
}

impl CloneGroup {
    pub fn is_valid(&self, min_group_size: usize) -> bool {
        self.fragments.len() >= min_group_size
    }
}

#[derive(Debug, Clone, Default)]
pub struct DuplicationSummary {
    pub total_groups: usize,
    pub total_duplicated_lines: usize,
    pub total_lines: usize,
}

impl DuplicationSummary {
    pub fn ratio(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.total_duplicated_lines as f64 / self.total_lines as f64
        }
    }
}
