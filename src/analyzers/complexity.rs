//! Complexity analyzer (SPEC_FULL.md §4.4).
//!
//! Per function: cyclomatic complexity (1 + decision points) and cognitive
//! complexity (a depth-weighted walk over the body). Both are computed from
//! the same tree-sitter tree in one pass so a file that fails to parse is
//! skipped once, not twice.

use crate::model::source::FunctionNode;
use crate::model::Language;
use crate::parser::{self, languages};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexityMetrics {
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub nesting_max: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FunctionComplexity {
    pub function: FunctionSummary,
    pub metrics: ComplexityMetrics,
}

/// A lightweight copy of `FunctionNode`'s identity fields, owned so reports
/// don't need to keep the parse tree alive.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FunctionSummary {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl From<&FunctionNode> for FunctionSummary {
    fn from(f: &FunctionNode) -> Self {
        Self {
            name: f.name.clone(),
            start_line: f.start_line,
            end_line: f.end_line,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileComplexity {
    pub path: PathBuf,
    pub functions: Vec<FunctionComplexity>,
    pub total: ComplexityMetrics,
}

#[derive(Debug, Clone)]
pub enum ComplexityAnalysisError {
    Unparseable,
}

/// Extract `FunctionNode`s from a parsed tree for `language`. Names come
/// from the function node's own text when tree-sitter doesn't expose a
/// named child field uniformly across grammars.
pub fn extract_functions(language: Language, source: &[u8], tree: &tree_sitter::Tree) -> Vec<FunctionNode> {
    let kinds = languages::function_node_kinds(language);
    if kinds.is_empty() {
        return Vec::new();
    }
    parser::nodes_of_kind(tree, kinds)
        .into_iter()
        .map(|node| {
            let name = function_name(node, source).unwrap_or_else(|| "<anonymous>".to_string());
            FunctionNode {
                name,
                start_line: node.start_position().row as u32 + 1,
                end_line: node.end_position().row as u32 + 1,
                signature: None,
                body_range: node.byte_range(),
            }
        })
        .collect()
}

fn function_name<'a>(node: tree_sitter::Node<'a>, source: &[u8]) -> Option<String> {
    for field in ["name", "declarator"] {
        if let Some(child) = node.child_by_field_name(field) {
            if let Ok(text) = child.utf8_text(source) {
                return Some(text.to_string());
            }
        }
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == "identifier" || c.kind() == "property_identifier")
        .and_then(|c| c.utf8_text(source).ok())
        .map(|s| s.to_string())
}

/// Cyclomatic complexity: `1 + decision points within the node's byte range`.
fn cyclomatic_complexity(language: Language, tree: &tree_sitter::Tree, range: &std::ops::Range<usize>) -> u32 {
    let decision_kinds = languages::decision_point_kinds(language);
    let mut count: u32 = 0;
    parser::walk(tree, |node, _depth| {
        let start = node.start_byte();
        if start < range.start || start >= range.end {
            return;
        }
        if decision_kinds.contains(&node.kind()) {
            count += 1;
        }
    });
    1 + count
}

struct CognitiveWalk<'a> {
    nesting: &'a [&'a str],
    flat: &'a [&'a str],
    range: std::ops::Range<usize>,
    score: u32,
    max_depth: u32,
}

impl<'a> CognitiveWalk<'a> {
    fn visit(&mut self, node: tree_sitter::Node<'a>, depth: u32) {
        let start = node.start_byte();
        if start < self.range.start || start >= self.range.end {
            return;
        }
        let kind = node.kind();
        let next_depth = if self.nesting.contains(&kind) {
            self.score += 1 + depth;
            self.max_depth = self.max_depth.max(depth + 1);
            depth + 1
        } else if self.flat.contains(&kind) {
            self.score += 1 + depth;
            depth
        } else {
            depth
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, next_depth);
        }
    }
}

/// Descend from `node` to the innermost descendant whose byte span still
/// fully covers `range` — i.e. the function's own node. Needed because the
/// walk must start inside the function, not at the file root: starting at
/// the root and pruning by `start_byte() < range.start` would prune the
/// root itself (and so every function but the first one in the file).
fn innermost_covering_node<'a>(node: tree_sitter::Node<'a>, range: &std::ops::Range<usize>) -> tree_sitter::Node<'a> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() <= range.start && child.end_byte() >= range.end {
            return innermost_covering_node(child, range);
        }
    }
    node
}

fn cognitive_complexity(
    language: Language,
    tree: &tree_sitter::Tree,
    range: &std::ops::Range<usize>,
) -> (u32, u32) {
    let mut walker = CognitiveWalk {
        nesting: languages::nesting_kinds(language),
        flat: languages::flat_kinds(language),
        range: range.clone(),
        score: 0,
        max_depth: 0,
    };
    let start_node = innermost_covering_node(tree.root_node(), range);
    walker.visit(start_node, 0);
    (walker.score, walker.max_depth)
}

pub fn analyze_file(
    path: &PathBuf,
    language: Language,
    source: &[u8],
) -> Result<FileComplexity, ComplexityAnalysisError> {
    let tree = parser::parse(language, source).ok_or(ComplexityAnalysisError::Unparseable)?;
    let functions = extract_functions(language, source, &tree);

    let mut total = ComplexityMetrics::default();
    let mut results = Vec::with_capacity(functions.len());

    for function in &functions {
        let cyclomatic = cyclomatic_complexity(language, &tree, &function.body_range);
        let (cognitive, nesting_max) = cognitive_complexity(language, &tree, &function.body_range);
        let metrics = ComplexityMetrics {
            cyclomatic,
            cognitive,
            nesting_max,
        };
        total.cyclomatic += cyclomatic;
        total.cognitive += cognitive;
        total.nesting_max = total.nesting_max.max(nesting_max);
        results.push(FunctionComplexity {
            function: FunctionSummary::from(function),
            metrics,
        });
    }

    Ok(FileComplexity {
        path: path.clone(),
        functions: results,
        total,
    })
}

/// Percentiles over a sorted slice using nearest-rank interpolation.
/// Shared shape with the other analyzers that roll up p50/p90/p95
/// (SPEC_FULL.md §4.4, §4.9, §4.11).
pub fn percentile(sorted: &[u32], pct: f64) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ComplexitySummary {
    pub total_files: usize,
    pub total_functions: usize,
    pub avg_cyclomatic: f64,
    pub avg_cognitive: f64,
    pub p50_cyclomatic: u32,
    pub p90_cyclomatic: u32,
    pub p95_cyclomatic: u32,
    pub p50_cognitive: u32,
    pub p90_cognitive: u32,
    pub p95_cognitive: u32,
}

pub fn summarize(files: &[FileComplexity]) -> ComplexitySummary {
    let mut cyclomatic: Vec<u32> = Vec::new();
    let mut cognitive: Vec<u32> = Vec::new();

    for file in files {
        for f in &file.functions {
            cyclomatic.push(f.metrics.cyclomatic);
            cognitive.push(f.metrics.cognitive);
        }
    }
    cyclomatic.sort_unstable();
    cognitive.sort_unstable();

    let total_functions = cyclomatic.len();
    let avg = |v: &[u32]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().sum::<u32>() as f64 / v.len() as f64
        }
    };

    ComplexitySummary {
        total_files: files.len(),
        total_functions,
        avg_cyclomatic: avg(&cyclomatic),
        avg_cognitive: avg(&cognitive),
        p50_cyclomatic: percentile(&cyclomatic, 50.0),
        p90_cyclomatic: percentile(&cyclomatic, 90.0),
        p95_cyclomatic: percentile(&cyclomatic, 95.0),
        p50_cognitive: percentile(&cognitive, 50.0),
        p90_cognitive: percentile(&cognitive, 90.0),
        p95_cognitive: percentile(&cognitive, 95.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_function_has_cyclomatic_one() {
        let src = b"fn add(a: i32, b: i32) -> i32 { a + b }";
        let file = analyze_file(&PathBuf::from("a.rs"), Language::Rust, src).unwrap();
        assert_eq!(file.functions.len(), 1);
        assert_eq!(file.functions[0].metrics.cyclomatic, 1);
        assert_eq!(file.functions[0].metrics.cognitive, 0);
    }

    #[test]
    fn each_if_branch_adds_one_cyclomatic() {
        let src = b"fn f(x: i32) -> i32 { if x > 0 { 1 } else { 2 } }";
        let file = analyze_file(&PathBuf::from("a.rs"), Language::Rust, src).unwrap();
        assert_eq!(file.functions[0].metrics.cyclomatic, 2);
    }

    #[test]
    fn nested_if_increases_cognitive_more_than_sequential_if() {
        let nested = b"fn f(x: i32, y: i32) { if x > 0 { if y > 0 { } } }";
        let sequential = b"fn f(x: i32, y: i32) { if x > 0 { } if y > 0 { } }";
        let nested_file = analyze_file(&PathBuf::from("a.rs"), Language::Rust, nested).unwrap();
        let seq_file = analyze_file(&PathBuf::from("b.rs"), Language::Rust, sequential).unwrap();
        assert!(nested_file.functions[0].metrics.cognitive > seq_file.functions[0].metrics.cognitive);
    }

    #[test]
    fn two_function_file_extracts_both() {
        let src = b"fn a() {}\nfn b() { if true {} }\n";
        let file = analyze_file(&PathBuf::from("a.rs"), Language::Rust, src).unwrap();
        assert_eq!(file.functions.len(), 2);
        assert_eq!(file.functions[0].function.name, "a");
        assert_eq!(file.functions[1].function.name, "b");
    }

    #[test]
    fn unparseable_language_is_an_error() {
        let err = analyze_file(&PathBuf::from("a.xyz"), Language::Other, b"???");
        assert!(err.is_err());
    }

    #[test]
    fn percentile_of_empty_slice_is_zero() {
        assert_eq!(percentile(&[], 90.0), 0);
    }

    #[test]
    fn summary_reports_total_functions_across_files() {
        let f1 = analyze_file(&PathBuf::from("a.rs"), Language::Rust, b"fn a() {}").unwrap();
        let f2 = analyze_file(&PathBuf::from("b.rs"), Language::Rust, b"fn b() {} fn c() {}").unwrap();
        let summary = summarize(&[f1, f2]);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.total_functions, 3);
    }
}
