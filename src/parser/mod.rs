//! Parser pool (SPEC_FULL.md §4.3).
//!
//! One `tree_sitter::Parser` per worker thread, reused across files of
//! the same language so the grammar only gets loaded once per thread.
//! Every analyzer that needs a CST goes through this pool rather than
//! constructing its own parser.

pub mod languages;

use crate::error::ContentError;
use crate::model::Language;
use std::cell::RefCell;
use std::path::Path;

thread_local! {
    static PARSER: RefCell<tree_sitter::Parser> = RefCell::new(tree_sitter::Parser::new());
}

/// Parse `source` as `language` on the current thread, reusing this
/// thread's cached `tree_sitter::Parser`. Returns `None` for languages
/// with no grammar (`Language::Other`) or bytes the grammar can't parse
/// into a usable tree.
pub fn parse(language: Language, source: &[u8]) -> Option<tree_sitter::Tree> {
    let ts_lang = languages::ts_language(language)?;
    PARSER.with(|cell| {
        let mut parser = cell.borrow_mut();
        parser.set_language(&ts_lang).ok()?;
        parser.parse(source, None)
    })
}

pub fn parse_file(path: &Path, source: &[u8]) -> Option<(Language, tree_sitter::Tree)> {
    let ext = path.extension().and_then(|e| e.to_str())?;
    let language = Language::from_extension(ext);
    if language == Language::Other {
        return None;
    }
    let tree = parse(language, source)?;
    Some((language, tree))
}

pub fn content_error_for_parse_failure(path: &Path) -> ContentError {
    ContentError::ParseFailed {
        path: path.to_path_buf(),
        reason: "tree-sitter produced no tree".to_string(),
    }
}

/// Depth-first walk of a parsed tree, invoking `visit` on every node with
/// its depth. Used by the complexity, duplication, and smell analyzers,
/// which each fold over the same traversal with a different accumulator.
pub fn walk<'a>(tree: &'a tree_sitter::Tree, mut visit: impl FnMut(tree_sitter::Node<'a>, usize)) {
    fn go<'a>(node: tree_sitter::Node<'a>, depth: usize, visit: &mut impl FnMut(tree_sitter::Node<'a>, usize)) {
        visit(node, depth);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            go(child, depth + 1, visit);
        }
    }
    go(tree.root_node(), 0, &mut visit);
}

/// Collect every node whose kind is in `kinds`.
pub fn nodes_of_kind<'a>(tree: &'a tree_sitter::Tree, kinds: &[&str]) -> Vec<tree_sitter::Node<'a>> {
    let mut out = Vec::new();
    walk(tree, |node, _depth| {
        if kinds.contains(&node.kind()) {
            out.push(node);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rust_source() {
        let tree = parse(Language::Rust, b"fn main() { let x = 1; }").expect("parses");
        assert_eq!(tree.root_node().kind(), "source_file");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn other_language_does_not_parse() {
        assert!(parse(Language::Other, b"whatever").is_none());
    }

    #[test]
    fn walk_visits_every_descendant() {
        let tree = parse(Language::Rust, b"fn a() {} fn b() {}").unwrap();
        let mut count = 0;
        walk(&tree, |_node, _depth| count += 1);
        assert!(count > 2);
    }

    #[test]
    fn nodes_of_kind_finds_function_items() {
        let tree = parse(Language::Rust, b"fn a() {} fn b() {}").unwrap();
        let funcs = nodes_of_kind(&tree, languages::function_node_kinds(Language::Rust));
        assert_eq!(funcs.len(), 2);
    }

    #[test]
    fn reusing_thread_local_parser_across_languages_still_works() {
        let rust_tree = parse(Language::Rust, b"fn a() {}").unwrap();
        let py_tree = parse(Language::Python, b"def a():\n    pass\n").unwrap();
        assert_eq!(rust_tree.root_node().kind(), "source_file");
        assert_eq!(py_tree.root_node().kind(), "module");
    }
}
