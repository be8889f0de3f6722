//! Per-language node-kind tables.
//!
//! Every language is parsed through the same `tree_sitter::Tree`, but the
//! *meaning* of a node kind (is this a decision point? a nesting
//! construct? a function definition?) is necessarily per-language. This
//! module is the single place those tables live, grounded on each
//! grammar's published node-kind vocabulary.

use crate::model::Language;

pub fn ts_language(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
        Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
        Language::C => Some(tree_sitter_c::LANGUAGE.into()),
        Language::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
        Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
        Language::Ruby => Some(tree_sitter_ruby::LANGUAGE.into()),
        Language::Php => Some(tree_sitter_php::LANGUAGE_PHP.into()),
        Language::Other => None,
    }
}

/// Node kinds that are function/method definitions for this language, and
/// the field name that holds the identifier child (used for name
/// extraction).
pub fn function_node_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &["function_item"],
        Language::Python => &["function_definition"],
        Language::JavaScript | Language::TypeScript => {
            &["function_declaration", "method_definition", "arrow_function"]
        }
        Language::Go => &["function_declaration", "method_declaration"],
        Language::Java | Language::CSharp => &["method_declaration", "constructor_declaration"],
        Language::C | Language::Cpp => &["function_definition"],
        Language::Ruby => &["method"],
        Language::Php => &["function_definition", "method_declaration"],
        Language::Other => &[],
    }
}

pub fn class_node_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Java | Language::CSharp => &["class_declaration"],
        Language::Python => &["class_definition"],
        Language::Ruby => &["class"],
        Language::TypeScript => &["class_declaration"],
        _ => &[],
    }
}

/// Node kinds contributing one decision point to cyclomatic complexity
/// (SPEC_FULL.md §4.4: branch statements, loop headers, case labels,
/// try/catch, ternary, and short-circuit boolean operators).
pub fn decision_point_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &[
            "if_expression",
            "if_let_expression",
            "while_expression",
            "while_let_expression",
            "loop_expression",
            "for_expression",
            "match_arm",
            "binary_expression_and",
            "binary_expression_or",
            "&&",
            "||",
        ],
        Language::Python => &[
            "if_statement",
            "elif_clause",
            "while_statement",
            "for_statement",
            "except_clause",
            "conditional_expression",
            "and",
            "or",
        ],
        Language::Go => &[
            "if_statement",
            "for_statement",
            "expression_case",
            "type_case",
            "select_statement",
            "&&",
            "||",
        ],
        Language::JavaScript | Language::TypeScript => &[
            "if_statement",
            "while_statement",
            "for_statement",
            "for_in_statement",
            "switch_case",
            "catch_clause",
            "ternary_expression",
            "&&",
            "||",
        ],
        Language::Java | Language::CSharp => &[
            "if_statement",
            "while_statement",
            "for_statement",
            "switch_label",
            "catch_clause",
            "conditional_expression",
            "&&",
            "||",
        ],
        Language::C | Language::Cpp => &[
            "if_statement",
            "while_statement",
            "for_statement",
            "case_statement",
            "catch_clause",
            "conditional_expression",
            "&&",
            "||",
        ],
        Language::Ruby => &["if", "elsif", "while", "until", "for", "when", "rescue", "&&", "||"],
        Language::Php => &[
            "if_statement",
            "while_statement",
            "for_statement",
            "foreach_statement",
            "case_statement",
            "catch_clause",
            "conditional_expression",
            "&&",
            "||",
        ],
        Language::Other => &[],
    }
}

/// Node kinds that add `1 + depth` and recurse at `depth + 1` for cognitive
/// complexity (SPEC_FULL.md §4.4 "nesting" set).
pub fn nesting_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &[
            "if_expression",
            "while_expression",
            "loop_expression",
            "for_expression",
            "match_expression",
        ],
        Language::Python => &["if_statement", "while_statement", "for_statement", "try_statement"],
        Language::Go => &["if_statement", "for_statement", "select_statement", "type_switch_statement"],
        Language::JavaScript | Language::TypeScript => {
            &["if_statement", "while_statement", "for_statement", "for_in_statement", "switch_statement", "try_statement"]
        }
        Language::Java | Language::CSharp => {
            &["if_statement", "while_statement", "for_statement", "switch_statement", "try_statement"]
        }
        Language::C | Language::Cpp => &["if_statement", "while_statement", "for_statement", "switch_statement"],
        Language::Ruby => &["if", "while", "until", "for", "case", "begin"],
        Language::Php => &["if_statement", "while_statement", "for_statement", "foreach_statement", "switch_statement"],
        Language::Other => &[],
    }
}

/// Node kinds that add `1 + depth` but recurse at the *same* depth
/// (SPEC_FULL.md §4.4 "flat" set: else, break, continue, goto, ...).
pub fn flat_kinds(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &["else_clause", "break_expression", "continue_expression"],
        Language::Python => &["else_clause", "elif_clause", "break_statement", "continue_statement"],
        Language::Go => &["else", "break_statement", "continue_statement", "goto_statement"],
        Language::JavaScript | Language::TypeScript => &["else_clause", "break_statement", "continue_statement"],
        Language::Java | Language::CSharp => &["else", "break_statement", "continue_statement", "goto_statement"],
        Language::C | Language::Cpp => &["else", "break_statement", "continue_statement", "goto_statement"],
        Language::Ruby => &["else", "next", "break"],
        Language::Php => &["else_clause", "break_statement", "continue_statement", "goto_statement"],
        Language::Other => &[],
    }
}

/// Visibility inference per language convention (SPEC_FULL.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Unknown,
}

pub fn infer_visibility(language: Language, name: &str, has_pub_keyword: bool) -> Visibility {
    match language {
        Language::Go => {
            if name.chars().next().is_some_and(|c| c.is_uppercase()) {
                Visibility::Public
            } else {
                Visibility::Private
            }
        }
        Language::Python | Language::Ruby => {
            if name.starts_with('_') {
                Visibility::Private
            } else {
                Visibility::Public
            }
        }
        Language::Rust => {
            if has_pub_keyword {
                Visibility::Public
            } else {
                Visibility::Private
            }
        }
        _ => Visibility::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_visibility_follows_case() {
        assert_eq!(infer_visibility(Language::Go, "DoThing", false), Visibility::Public);
        assert_eq!(infer_visibility(Language::Go, "doThing", false), Visibility::Private);
    }

    #[test]
    fn python_visibility_follows_leading_underscore() {
        assert_eq!(infer_visibility(Language::Python, "_helper", false), Visibility::Private);
        assert_eq!(infer_visibility(Language::Python, "helper", false), Visibility::Public);
    }

    #[test]
    fn known_languages_have_function_node_kinds() {
        for lang in [Language::Rust, Language::Python, Language::Go, Language::JavaScript] {
            assert!(!function_node_kinds(lang).is_empty());
        }
    }
}
