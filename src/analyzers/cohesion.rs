//! Cohesion analyzer: CK metrics (SPEC_FULL.md §4.8).
//!
//! Computed only for object-oriented-capable languages. Field and call
//! references are resolved by bare identifier, the same limitation the
//! dead-code analyzer documents: conservative, not a full type resolver.

use crate::model::Language;
use crate::parser::{self, languages};
use crate::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name: String,
    pub file: PathBuf,
    pub line: u32,
    pub wmc: u32,
    pub cbo: u32,
    pub rfc: u32,
    pub lcom4: u32,
    pub dit: u32,
    pub noc: u32,
}

struct ClassInfo {
    name: String,
    line: u32,
    superclass: Option<String>,
    methods: Vec<(String, std::ops::Range<usize>)>,
}

fn extract_classes<'a>(language: Language, source: &'a [u8], tree: &'a tree_sitter::Tree) -> Vec<ClassInfo> {
    let class_kinds = languages::class_node_kinds(language);
    let method_kinds = languages::function_node_kinds(language);
    if class_kinds.is_empty() {
        return Vec::new();
    }

    parser::nodes_of_kind(tree, class_kinds)
        .into_iter()
        .map(|class_node| {
            let name = node_name(class_node, source);
            let superclass = superclass_name(class_node, source);
            let mut methods = Vec::new();
            parser::walk(tree, |node, _| {
                if method_kinds.contains(&node.kind())
                    && node.start_byte() >= class_node.start_byte()
                    && node.end_byte() <= class_node.end_byte()
                {
                    methods.push((node_name(node, source), node.byte_range()));
                }
            });
            ClassInfo {
                name,
                line: class_node.start_position().row as u32 + 1,
                superclass,
                methods,
            }
        })
        .collect()
}

fn node_name(node: tree_sitter::Node, source: &[u8]) -> String {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("<anonymous>")
        .to_string()
}

fn superclass_name(class_node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    for field in ["superclass", "superclasses", "extends_clause", "base_class_clause"] {
        if let Some(n) = class_node.child_by_field_name(field) {
            if let Ok(text) = n.utf8_text(source) {
                let cleaned = text.trim_start_matches("extends").trim();
                if !cleaned.is_empty() {
                    return Some(cleaned.split(['(', ',', ' ']).next().unwrap_or(cleaned).to_string());
                }
            }
        }
    }
    None
}

/// Identifiers following `self.` or `this.`, a cross-language approximation
/// of "field accessed by this method".
fn field_references(body: &str) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    for prefix in ["self.", "this.", "@"] {
        let mut rest = body;
        while let Some(pos) = rest.find(prefix) {
            let after = &rest[pos + prefix.len()..];
            let ident: String = after.chars().take_while(|c| c.is_alphanumeric() || *c == '_').collect();
            if !ident.is_empty() {
                fields.insert(ident);
            }
            rest = &after[ident.len().min(after.len())..];
        }
    }
    fields
}

/// Bare-identifier call sites, reused from the same pattern the dead-code
/// analyzer uses.
fn call_names(body: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut current = String::new();
    for c in body.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            if c == '(' && !current.is_empty() {
                names.insert(current.clone());
            }
            current.clear();
        }
    }
    names
}

/// Capitalized identifiers not matching `own_class`, a proxy for "other
/// class referenced" used to approximate CBO without full type resolution.
fn other_class_references(body: &str, own_class: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut current = String::new();
    for c in body.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            if current.chars().next().is_some_and(|c| c.is_uppercase()) && current != own_class {
                names.insert(current.clone());
            }
            current.clear();
        }
    }
    if current.chars().next().is_some_and(|c| c.is_uppercase()) && current != own_class {
        names.insert(current);
    }
    names
}

fn cyclomatic_of(language: Language, tree: &tree_sitter::Tree, range: &std::ops::Range<usize>) -> u32 {
    let decision_kinds = languages::decision_point_kinds(language);
    let mut count = 1u32;
    parser::walk(tree, |node, _| {
        let start = node.start_byte();
        if start >= range.start && start < range.end && decision_kinds.contains(&node.kind()) {
            count += 1;
        }
    });
    count
}

pub fn analyze_file(path: &Path, language: Language, source: &[u8]) -> Vec<ClassMetrics> {
    if !language.is_object_oriented_capable() {
        return Vec::new();
    }
    let Some(tree) = parser::parse(language, source) else {
        return Vec::new();
    };
    let classes = extract_classes(language, source, &tree);
    let source_str = String::from_utf8_lossy(source);

    classes
        .iter()
        .map(|class| {
            let wmc: u32 = class
                .methods
                .iter()
                .map(|(_, range)| cyclomatic_of(language, &tree, range))
                .sum();

            let mut all_fields: BTreeSet<String> = BTreeSet::new();
            let mut all_calls: BTreeSet<String> = BTreeSet::new();
            let mut all_other_classes: BTreeSet<String> = BTreeSet::new();
            let mut method_fields: Vec<BTreeSet<String>> = Vec::with_capacity(class.methods.len());

            for (name, range) in &class.methods {
                let body = &source_str[range.clone()];
                let fields = field_references(body);
                all_fields.extend(fields.iter().cloned());
                method_fields.push(fields);

                for call in call_names(body) {
                    if !class.methods.iter().any(|(n, _)| n == &call) {
                        all_calls.insert(call);
                    }
                }
                all_other_classes.extend(other_class_references(body, &class.name));
                let _ = name;
            }

            let method_count = class.methods.len();
            let field_count = all_fields.len();
            let mut uf = UnionFind::new(method_count + field_count);
            let field_index: std::collections::BTreeMap<&String, usize> =
                all_fields.iter().enumerate().map(|(i, f)| (f, method_count + i)).collect();

            for (i, fields) in method_fields.iter().enumerate() {
                for f in fields {
                    if let Some(&fi) = field_index.get(f) {
                        uf.union(i, fi);
                    }
                }
            }
            let lcom4 = if method_count + field_count == 0 {
                1
            } else {
                uf.component_count() as u32
            };

            ClassMetrics {
                name: class.name.clone(),
                file: path.to_path_buf(),
                line: class.line,
                wmc,
                cbo: all_other_classes.len() as u32,
                rfc: (method_count + all_calls.len()) as u32,
                lcom4,
                dit: if class.superclass.is_some() { 2 } else { 1 },
                noc: 0,
            }
        })
        .collect()
}

/// Second pass over every file's classes to fill in NOC (direct subclass
/// count), which needs the whole project's class list.
pub fn compute_noc(per_file: &mut [Vec<ClassMetrics>], superclass_of: &std::collections::HashMap<String, Option<String>>) {
    let mut noc_counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    for sup in superclass_of.values().flatten() {
        *noc_counts.entry(sup.clone()).or_insert(0) += 1;
    }
    for classes in per_file.iter_mut() {
        for class in classes.iter_mut() {
            class.noc = noc_counts.get(&class.name).copied().unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_fields_shared_by_all_methods_is_perfectly_cohesive() {
        let src = b"class Box:\n    def set(self, v):\n        self.v = v\n    def get(self):\n        return self.v\n";
        let classes = analyze_file(Path::new("a.py"), Language::Python, src);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].lcom4, 1);
    }

    #[test]
    fn disjoint_field_usage_splits_into_components() {
        let src = b"class Box:\n    def set_a(self, v):\n        self.a = v\n    def set_b(self, v):\n        self.b = v\n";
        let classes = analyze_file(Path::new("a.py"), Language::Python, src);
        assert_eq!(classes[0].lcom4, 2);
    }

    #[test]
    fn non_oo_language_yields_no_classes() {
        let classes = analyze_file(Path::new("a.go"), Language::Go, b"func main() {}");
        assert!(classes.is_empty());
    }

    #[test]
    fn class_with_no_methods_or_fields_is_cohesive_by_definition() {
        let src = b"class Empty:\n    pass\n";
        let classes = analyze_file(Path::new("a.py"), Language::Python, src);
        assert_eq!(classes[0].lcom4, 1);
    }
}
