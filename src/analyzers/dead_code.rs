//! Dead-code analyzer (SPEC_FULL.md §4.7).
//!
//! Builds a project-wide reference graph (reusing [`DependencyGraph`], the
//! same flat node/edge model the §4.9 graph analyzer uses), seeds it with
//! an entry-point set, and reports every definition a breadth-first walk
//! from those entry points never reaches.
//!
//! Call resolution is by bare identifier name, not full type/import
//! resolution: a call to `helper()` links to every definition named
//! `helper` in the project. This overapproximates reachability (a false
//! "live" verdict is possible when two unrelated functions share a name)
//! but never underapproximates it, which keeps dead-code reports
//! conservative.

use crate::config::DeadCodeConfig;
use crate::model::graph::{DependencyGraph, DependencyGraphBuilder, EdgeKind, GraphNode, NodeIndex, NodeKind};
use crate::model::Language;
use crate::parser::{self, languages};
use crate::parser::languages::Visibility;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DeadCodeCandidate {
    pub name: String,
    pub file: PathBuf,
    pub line: Option<u32>,
    pub confidence: f64,
}

fn is_entry_point_name(language: Language, name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if name == "main" || name == "init" {
        return true;
    }
    match language {
        Language::Go => name.starts_with("Test") || name.starts_with("Benchmark") || name.starts_with("Example"),
        Language::Python => lower.starts_with("test_") || name == "__init__" || name == "__main__",
        Language::Rust => lower.starts_with("test_"),
        Language::Java | Language::CSharp => lower.starts_with("test") || name == "Main",
        Language::Ruby => lower.starts_with("test_"),
        _ => lower.starts_with("test_") || lower.starts_with("bench_"),
    }
}

struct FileDefs {
    path: PathBuf,
    language: Language,
    source: String,
}

/// Build the project-wide reference graph and return it alongside the
/// confidence each node would get if unreached (computed up front so the
/// caller doesn't need the parse trees again after BFS).
pub fn build_reference_graph(
    files: &[(PathBuf, Language, String)],
) -> (DependencyGraph, BTreeMap<String, f64>) {
    let mut builder = DependencyGraphBuilder::new();
    let mut confidence = BTreeMap::new();
    // name -> list of node ids, for call resolution by bare identifier.
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut file_defs = Vec::new();

    for (path, language, source) in files {
        let kinds = languages::function_node_kinds(*language);
        if kinds.is_empty() {
            continue;
        }
        let Some(tree) = parser::parse(*language, source.as_bytes()) else {
            continue;
        };
        let mut defs_here = Vec::new();
        for node in parser::nodes_of_kind(&tree, kinds) {
            let name = function_name(node, source.as_bytes());
            let id = format!("{}::{}::{}", path.display(), name, node.start_byte());
            let has_pub = node
                .utf8_text(source.as_bytes())
                .map(|t| t.trim_start().starts_with("pub "))
                .unwrap_or(false);
            let visibility = languages::infer_visibility(*language, &name, has_pub);

            builder.add_node(GraphNode {
                id: id.clone(),
                name: name.clone(),
                kind: NodeKind::Function,
                file: path.to_string_lossy().to_string(),
                line: Some(node.start_position().row as u32 + 1),
                attributes: BTreeMap::new(),
            });

            let conf = match visibility {
                Visibility::Private => 0.9,
                Visibility::Public => 0.4,
                Visibility::Unknown => 0.6,
            };
            confidence.insert(id.clone(), conf);
            by_name.entry(name.clone()).or_default().push(id.clone());
            defs_here.push((id, name, node.byte_range()));
        }
        file_defs.push((path.clone(), *language, source.clone(), defs_here));
    }

    // Second pass: scan each function body for call-shaped identifiers and
    // link to every definition sharing that bare name.
    for (path, _language, source, defs) in &file_defs {
        for (caller_id, _name, range) in defs {
            let body = &source.as_bytes()[range.clone()];
            for called_name in call_identifiers(body) {
                if let Some(targets) = by_name.get(&called_name) {
                    for target in targets {
                        if target != caller_id {
                            builder.add_edge(caller_id.clone(), target.clone(), EdgeKind::Call, 1.0);
                        }
                    }
                }
            }
        }
        let _ = path;
    }

    (builder.build(), confidence)
}

/// Very small identifier-before-`(` scanner, used only for call-edge
/// discovery (not for parsing, so no per-language grammar needed).
fn call_identifiers(body: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    let mut names = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            if c == '(' && !current.is_empty() {
                names.push(current.clone());
            }
            current.clear();
        }
    }
    names
}

fn function_name(node: tree_sitter::Node, source: &[u8]) -> String {
    for field in ["name", "declarator"] {
        if let Some(child) = node.child_by_field_name(field) {
            if let Ok(text) = child.utf8_text(source) {
                return text.to_string();
            }
        }
    }
    "<anonymous>".to_string()
}

/// Breadth-first reachability from the entry-point set. Returns the
/// candidates (never reached) that meet `min_confidence`.
pub fn find_dead_code(
    graph: &DependencyGraph,
    confidence: &BTreeMap<String, f64>,
    files: &[(PathBuf, Language, String)],
    config: &DeadCodeConfig,
    min_confidence: f64,
) -> Vec<DeadCodeCandidate> {
    let language_of: BTreeMap<&Path, Language> = files.iter().map(|(p, l, _)| (p.as_path(), *l)).collect();

    let mut entry_points: Vec<NodeIndex> = Vec::new();
    for node in graph.nodes() {
        let lang = language_of.get(Path::new(&node.file)).copied().unwrap_or(Language::Other);
        let is_entry = is_entry_point_name(lang, &node.name)
            || (config.treat_exported_as_entry_point && confidence.get(&node.id).copied().unwrap_or(1.0) <= 0.5);
        if is_entry {
            if let Some(idx) = graph.index_of(&node.id) {
                entry_points.push(idx);
            }
        }
    }

    let mut visited = fixedbitset::FixedBitSet::with_capacity(graph.node_count());
    let mut queue = VecDeque::new();
    for e in &entry_points {
        if !visited.contains(e.0 as usize) {
            visited.insert(e.0 as usize);
            queue.push_back(*e);
        }
    }
    while let Some(idx) = queue.pop_front() {
        for edge in graph.outgoing_edges(idx) {
            if !visited.contains(edge.to.0 as usize) {
                visited.insert(edge.to.0 as usize);
                queue.push_back(edge.to);
            }
        }
    }

    let mut candidates = Vec::new();
    for (i, node) in graph.nodes().iter().enumerate() {
        if visited.contains(i) {
            continue;
        }
        let conf = confidence.get(&node.id).copied().unwrap_or(0.5);
        if conf >= min_confidence {
            candidates.push(DeadCodeCandidate {
                name: node.name.clone(),
                file: PathBuf::from(&node.file),
                line: node.line,
                confidence: conf,
            });
        }
    }
    candidates.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_private_function_is_reported() {
        let files = vec![(
            PathBuf::from("a.rs"),
            Language::Rust,
            "fn main() { helper(); }\nfn helper() {}\nfn orphan() {}\n".to_string(),
        )];
        let (graph, confidence) = build_reference_graph(&files);
        let candidates = find_dead_code(&graph, &confidence, &files, &DeadCodeConfig::default(), 0.8);
        assert!(candidates.iter().any(|c| c.name == "orphan"));
        assert!(!candidates.iter().any(|c| c.name == "helper"));
        assert!(!candidates.iter().any(|c| c.name == "main"));
    }

    #[test]
    fn low_confidence_candidates_are_filtered_by_threshold() {
        let files = vec![(
            PathBuf::from("a.go"),
            Language::Go,
            "func main() {}\nfunc Exported() {}\n".to_string(),
        )];
        let (graph, confidence) = build_reference_graph(&files);
        let strict = find_dead_code(&graph, &confidence, &files, &DeadCodeConfig::default(), 0.8);
        assert!(!strict.iter().any(|c| c.name == "Exported"));
        let lenient = find_dead_code(&graph, &confidence, &files, &DeadCodeConfig::default(), 0.3);
        assert!(lenient.iter().any(|c| c.name == "Exported"));
    }
}
