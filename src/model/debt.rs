//! Debt-marker (SATD) value types (SPEC_FULL.md §3, §4.6).

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtCategory {
    Design,
    Requirement,
    Security,
    Documentation,
    Test,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Critical => 4.0,
            Severity::High => 2.0,
            Severity::Medium => 1.0,
            Severity::Low => 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebtMarker {
    pub file: PathBuf,
    pub line: u32,
    pub category: DebtCategory,
    pub severity: Severity,
    pub raw_text: String,
    pub description: Option<String>,
    /// Content-addressed identity for stable tracking across revisions
    /// (trend mode uses this to report debt age, not just debt count).
    pub context_hash: [u8; 16],
}
