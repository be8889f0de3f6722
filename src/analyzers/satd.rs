//! Debt-marker (SATD) analyzer (SPEC_FULL.md §4.6).
//!
//! Scans comment text for a fixed table of markers, classifies each hit
//! into (category, severity), and hashes the surrounding context with
//! blake3 so the same marker can be tracked across revisions.

use crate::config::SatdConfig;
use crate::model::debt::{DebtCategory, DebtMarker, Severity};
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use std::path::{Path, PathBuf};

struct MarkerRule {
    keyword: &'static str,
    category: DebtCategory,
    severity: Severity,
}

const MARKER_TABLE: &[MarkerRule] = &[
    MarkerRule { keyword: "SECURITY", category: DebtCategory::Security, severity: Severity::Critical },
    MarkerRule { keyword: "BUG", category: DebtCategory::Design, severity: Severity::High },
    MarkerRule { keyword: "FIXME", category: DebtCategory::Design, severity: Severity::High },
    MarkerRule { keyword: "HACK", category: DebtCategory::Design, severity: Severity::Medium },
    MarkerRule { keyword: "XXX", category: DebtCategory::Design, severity: Severity::Medium },
    MarkerRule { keyword: "REFACTOR", category: DebtCategory::Design, severity: Severity::Medium },
    MarkerRule { keyword: "TODO", category: DebtCategory::Requirement, severity: Severity::Low },
];

static MARKER_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(MARKER_TABLE.iter().map(|m| format!(r"\b{}\b", m.keyword))).expect("fixed marker table always compiles")
});

static STRICT_MARKER_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(MARKER_TABLE.iter().map(|m| format!(r"\b{}\s*:", m.keyword))).expect("fixed marker table always compiles")
});

fn is_test_file(path: &Path) -> bool {
    let s = path.to_string_lossy();
    s.contains("/tests/")
        || s.contains("_test.")
        || s.contains("test_")
        || s.ends_with("_test.go")
        || s.contains("/test/")
        || s.contains(".test.")
        || s.contains(".spec.")
}

/// Extract `(line_number, comment_text)` pairs using a simple, fast,
/// language-agnostic comment scanner: `//`, `#`, and `/* ... */` spans.
/// Good enough for marker detection; not a full lexer.
fn extract_comments(source: &str) -> Vec<(u32, String)> {
    let mut comments = Vec::new();
    let mut in_block = false;
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        if in_block {
            if let Some(end) = line.find("*/") {
                comments.push((line_no, line[..end].to_string()));
                in_block = false;
            } else {
                comments.push((line_no, line.to_string()));
            }
            continue;
        }
        if let Some(pos) = line.find("//") {
            comments.push((line_no, line[pos + 2..].to_string()));
        } else if let Some(pos) = line.find('#') {
            comments.push((line_no, line[pos + 1..].to_string()));
        } else if let Some(pos) = line.find("/*") {
            if let Some(end) = line[pos..].find("*/") {
                comments.push((line_no, line[pos + 2..pos + end].to_string()));
            } else {
                comments.push((line_no, line[pos + 2..].to_string()));
                in_block = true;
            }
        }
    }
    comments
}

fn classify(matched: &str, comment_text: &str) -> (DebtCategory, Severity) {
    let upper = matched.to_ascii_uppercase();
    let rule = MARKER_TABLE.iter().find(|m| upper.contains(m.keyword));
    let (mut category, mut severity) = rule
        .map(|r| (r.category, r.severity))
        .unwrap_or((DebtCategory::Other, Severity::Low));

    let lower = comment_text.to_ascii_lowercase();
    if lower.contains("security") && category != DebtCategory::Security {
        category = DebtCategory::Security;
        severity = severity.max(Severity::High);
    }
    if lower.contains("critical") {
        severity = Severity::Critical;
    }
    (category, severity)
}

fn context_hash(path: &Path, line: u32, text: &str) -> [u8; 16] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(&line.to_le_bytes());
    hasher.update(text.trim().as_bytes());
    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
    out
}

pub fn analyze_file(path: &Path, source: &str, config: &SatdConfig, custom: &[Regex]) -> Vec<DebtMarker> {
    if is_test_file(path) && !config.include_test_files {
        return Vec::new();
    }

    let set = if config.strict { &STRICT_MARKER_SET } else { &MARKER_SET };
    let mut markers = Vec::new();

    for (line, comment) in extract_comments(source) {
        let hits = set.matches(&comment);
        for idx in hits.iter() {
            let rule = &MARKER_TABLE[idx];
            let (category, severity) = classify(rule.keyword, &comment);
            markers.push(DebtMarker {
                file: path.to_path_buf(),
                line,
                category,
                severity,
                raw_text: comment.trim().to_string(),
                description: None,
                context_hash: context_hash(path, line, &comment),
            });
        }
        for pattern in custom {
            if pattern.is_match(&comment) {
                markers.push(DebtMarker {
                    file: path.to_path_buf(),
                    line,
                    category: DebtCategory::Other,
                    severity: Severity::Medium,
                    raw_text: comment.trim().to_string(),
                    description: Some("matched custom pattern".to_string()),
                    context_hash: context_hash(path, line, &comment),
                });
            }
        }
    }

    markers
}

pub fn compile_custom_patterns(config: &SatdConfig) -> Vec<Regex> {
    config
        .custom_patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SatdSummary {
    pub total: usize,
    pub by_severity_weighted: f64,
}

pub fn summarize(markers: &[DebtMarker]) -> SatdSummary {
    SatdSummary {
        total: markers.len(),
        by_severity_weighted: markers.iter().map(|m| m.severity.weight()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_todo_in_line_comment() {
        let markers = analyze_file(Path::new("a.rs"), "// TODO fix this later\nfn f() {}", &SatdConfig::default(), &[]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].category, DebtCategory::Requirement);
    }

    #[test]
    fn strict_mode_requires_colon() {
        let strict = SatdConfig { strict: true, ..SatdConfig::default() };
        let markers = analyze_file(Path::new("a.rs"), "// TODO fix this", &strict, &[]);
        assert!(markers.is_empty());
        let markers = analyze_file(Path::new("a.rs"), "// TODO: fix this", &strict, &[]);
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn security_keyword_in_comment_elevates_category() {
        let markers = analyze_file(Path::new("a.rs"), "// HACK around the security check", &SatdConfig::default(), &[]);
        assert_eq!(markers[0].category, DebtCategory::Security);
    }

    #[test]
    fn test_files_are_skipped_by_default() {
        let markers = analyze_file(Path::new("src/foo_test.go"), "// TODO: x", &SatdConfig::default(), &[]);
        assert!(markers.is_empty());
    }

    #[test]
    fn same_marker_text_at_same_location_hashes_identically() {
        let a = context_hash(Path::new("a.rs"), 3, "TODO: x");
        let b = context_hash(Path::new("a.rs"), 3, "TODO: x");
        assert_eq!(a, b);
    }
}
