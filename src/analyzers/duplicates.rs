//! Duplicate (clone) analyzer (SPEC_FULL.md §4.5).
//!
//! MinHash + LSH over token shingles. A language-aware lexer (kept
//! deliberately separate from the tree-sitter CST used elsewhere — see
//! SPEC_FULL.md §4.5) tokenizes each file; candidate fragments are
//! extracted function bodies, falling back to fixed-size windows for
//! fragments without a clear function boundary.

use crate::config::DuplicateConfig;
use crate::model::clone::{CloneGroup, CloneType, CodeFragment, DuplicationSummary};
use crate::model::Language;
use crate::parser::{self, languages};
use crate::unionfind::UnionFind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::xxh64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Identifier,
    Literal,
    Keyword,
    Other,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
}

const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "return", "fn", "def", "func", "function", "class", "struct",
    "impl", "match", "switch", "case", "break", "continue", "let", "var", "const", "public",
    "private", "static", "void", "int", "string", "bool", "true", "false", "null", "nil", "None",
];

fn tokenize(source: &str, ignore_comments: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if ignore_comments && c == '/' {
            let mut clone = chars.clone();
            clone.next();
            if let Some(&(_, next)) = clone.peek() {
                if next == '/' {
                    for (_, ch) in chars.by_ref() {
                        if ch == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                if next == '*' {
                    chars.next();
                    chars.next();
                    let mut prev = '\0';
                    for (_, ch) in chars.by_ref() {
                        if prev == '*' && ch == '/' {
                            break;
                        }
                        prev = ch;
                    }
                    continue;
                }
            }
        }
        if ignore_comments && c == '#' {
            for (_, ch) in chars.by_ref() {
                if ch == '\n' {
                    break;
                }
            }
            continue;
        }
        if c == '"' || c == '\'' {
            let quote = c;
            let mut text = String::new();
            text.push(chars.next().unwrap().1);
            while let Some(&(_, ch)) = chars.peek() {
                text.push(ch);
                chars.next();
                if ch == quote {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Literal,
                text,
            });
            continue;
        }
        if c.is_ascii_digit() {
            let mut text = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                    text.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Literal,
                text,
            });
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let mut text = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    text.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            let kind = if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token { kind, text });
            continue;
        }
        let mut text = String::new();
        text.push(chars.next().unwrap().1);
        tokens.push(Token {
            kind: TokenKind::Other,
            text,
        });
    }

    tokens
}

fn normalize(tokens: &[Token], config: &DuplicateConfig) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !(config.ignore_comments && t.kind == TokenKind::Other && t.text.trim().is_empty()))
        .map(|t| match t.kind {
            TokenKind::Identifier if config.normalize_identifiers => "\u{1}ID".to_string(),
            TokenKind::Literal if config.normalize_literals => "\u{1}LIT".to_string(),
            _ => t.text.clone(),
        })
        .collect()
}

fn shingles(tokens: &[String], shingle_size: usize) -> Vec<u64> {
    if tokens.len() < shingle_size {
        return Vec::new();
    }
    (0..=tokens.len() - shingle_size)
        .map(|i| {
            let joined = tokens[i..i + shingle_size].join("\u{0}");
            xxh64(joined.as_bytes(), 0)
        })
        .collect()
}

fn minhash_signature(shingles: &[u64], num_hash_functions: usize) -> Vec<u64> {
    (0..num_hash_functions)
        .map(|seed| shingles.iter().map(|s| xxh64(&s.to_le_bytes(), seed as u64)).min().unwrap_or(u64::MAX))
        .collect()
}

fn jaccard_estimate(a: &[u64], b: &[u64]) -> f64 {
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f64 / a.len().max(1) as f64
}

struct Candidate {
    fragment: CodeFragment,
    signature: Vec<u64>,
}

fn extract_fragments(path: &Path, language: Language, source: &str, config: &DuplicateConfig) -> Vec<(CodeFragment, Vec<String>)> {
    let kinds = languages::function_node_kinds(language);
    let mut fragments = Vec::new();

    if !kinds.is_empty() {
        if let Some(tree) = parser::parse(language, source.as_bytes()) {
            for node in parser::nodes_of_kind(&tree, kinds) {
                let text = node.utf8_text(source.as_bytes()).unwrap_or("");
                let tokens = normalize(&tokenize(text, config.ignore_comments), config);
                if tokens.len() < config.min_tokens {
                    continue;
                }
                fragments.push((
                    CodeFragment {
                        file: path.to_path_buf(),
                        start_line: node.start_position().row as u32 + 1,
                        end_line: node.end_position().row as u32 + 1,
                        token_count: tokens.len(),
                    },
                    tokens,
                ));
            }
            if !fragments.is_empty() {
                return fragments;
            }
        }
    }

    // No function boundaries available: fall back to fixed windows.
    let all_tokens = normalize(&tokenize(source, config.ignore_comments), config);
    let lines_total = source.lines().count().max(1) as u32;
    let tokens_per_line = (all_tokens.len() as f64 / lines_total as f64).max(1.0);
    let window = config.min_tokens.max(1);
    let mut i = 0;
    while i + window <= all_tokens.len() {
        let chunk = all_tokens[i..i + window].to_vec();
        let start_line = (i as f64 / tokens_per_line) as u32 + 1;
        let end_line = ((i + window) as f64 / tokens_per_line) as u32 + 1;
        fragments.push((
            CodeFragment {
                file: path.to_path_buf(),
                start_line,
                end_line,
                token_count: chunk.len(),
            },
            chunk,
        ));
        i += window;
    }
    fragments
}

/// Run clone detection over a set of already-read `(path, language, source)`
/// files. Files are expected to have already passed the scanner and size
/// cap; this function does no I/O.
pub fn detect(files: &[(PathBuf, Language, String)], config: &DuplicateConfig) -> (Vec<CloneGroup>, DuplicationSummary) {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut total_lines = 0usize;

    for (path, language, source) in files {
        total_lines += source.lines().count();
        for (fragment, tokens) in extract_fragments(path, *language, source, config) {
            let shingle_hashes = shingles(&tokens, config.shingle_size);
            if shingle_hashes.is_empty() {
                continue;
            }
            let signature = minhash_signature(&shingle_hashes, config.num_hash_functions);
            candidates.push(Candidate { fragment, signature });
        }
    }

    let n = candidates.len();
    let mut uf = UnionFind::new(n);

    // LSH: bucket by (band index, band hash); union everything sharing a bucket.
    let mut buckets: HashMap<(usize, u64), Vec<usize>> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        for band in 0..config.num_bands {
            let start = band * config.rows_per_band;
            let end = start + config.rows_per_band;
            let band_hash = xxh64(
                candidate.signature[start..end]
                    .iter()
                    .flat_map(|v| v.to_le_bytes())
                    .collect::<Vec<u8>>()
                    .as_slice(),
                0,
            );
            buckets.entry((band, band_hash)).or_default().push(idx);
        }
    }

    let mut min_similarity: HashMap<(usize, usize), f64> = HashMap::new();
    for members in buckets.values() {
        if members.len() < 2 {
            continue;
        }
        for i in 0..members.len() {
            for j in i + 1..members.len() {
                let (a, b) = (members[i], members[j]);
                let sim = jaccard_estimate(&candidates[a].signature, &candidates[b].signature);
                if sim >= config.similarity_threshold {
                    uf.union(a, b);
                    let key = (a.min(b), a.max(b));
                    min_similarity
                        .entry(key)
                        .and_modify(|s| *s = s.min(sim))
                        .or_insert(sim);
                }
            }
        }
    }

    let mut groups_by_root: HashMap<usize, Vec<usize>> = HashMap::new();
    for idx in 0..n {
        let root = uf.find(idx);
        groups_by_root.entry(root).or_default().push(idx);
    }

    let mut groups = Vec::new();
    let mut total_duplicated_lines = 0usize;

    for members in groups_by_root.values() {
        if members.len() < config.min_group_size {
            continue;
        }
        let mut worst = 1.0f64;
        for i in 0..members.len() {
            for j in i + 1..members.len() {
                let key = (members[i].min(members[j]), members[i].max(members[j]));
                if let Some(sim) = min_similarity.get(&key) {
                    worst = worst.min(*sim);
                }
            }
        }
        let clone_type = if worst >= 0.95 {
            CloneType::Type1
        } else if worst >= 0.90 && config.normalize_identifiers {
            CloneType::Type2
        } else {
            CloneType::Type3
        };

        let fragments: Vec<CodeFragment> = members.iter().map(|&i| candidates[i].fragment.clone()).collect();
        total_duplicated_lines += fragments
            .iter()
            .map(|f| (f.end_line.saturating_sub(f.start_line) + 1) as usize)
            .sum::<usize>();

        groups.push(CloneGroup {
            clone_type,
            fragments,
            min_similarity: worst,
        });
    }

    groups.sort_by(|a, b| b.fragments.len().cmp(&a.fragments.len()));

    let summary = DuplicationSummary {
        total_groups: groups.len(),
        total_duplicated_lines,
        total_lines,
    };

    (groups, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DuplicateConfig {
        let mut c = DuplicateConfig::default();
        c.min_tokens = 5;
        c
    }

    #[test]
    fn identical_functions_form_a_clone_group() {
        let body = "fn work(a: i32, b: i32) -> i32 { let x = a + b; let y = x * 2; y - a }";
        let src_a = format!("fn one() {{}} {body}");
        let src_b = format!("fn two() {{}} {body}");
        let files = vec![
            (PathBuf::from("a.rs"), Language::Rust, src_a),
            (PathBuf::from("b.rs"), Language::Rust, src_b),
        ];
        let (groups, summary) = detect(&files, &cfg());
        assert!(!groups.is_empty(), "expected at least one clone group");
        assert_eq!(groups[0].clone_type, CloneType::Type1);
        assert!(summary.total_groups >= 1);
    }

    #[test]
    fn unrelated_functions_do_not_clone() {
        let files = vec![
            (PathBuf::from("a.rs"), Language::Rust, "fn alpha() { let z = 1; z + 1; }".to_string()),
            (PathBuf::from("b.rs"), Language::Rust, "fn beta(s: &str) -> usize { s.len() }".to_string()),
        ];
        let (groups, _summary) = detect(&files, &cfg());
        assert!(groups.is_empty());
    }

    #[test]
    fn tokenizer_strips_line_comments_when_ignore_comments_is_set() {
        let tokens = tokenize("let x = 1; // a comment\nlet y = 2;", true);
        assert!(tokens.iter().all(|t| !t.text.contains("comment")));
    }

    #[test]
    fn tokenizer_keeps_line_comments_when_ignore_comments_is_unset() {
        let tokens = tokenize("let x = 1; // a comment\nlet y = 2;", false);
        assert!(tokens.iter().any(|t| t.text.contains("comment")));
    }

    #[test]
    fn duplication_summary_ratio_is_zero_with_no_duplicates() {
        let summary = DuplicationSummary {
            total_groups: 0,
            total_duplicated_lines: 0,
            total_lines: 100,
        };
        assert_eq!(summary.ratio(), 0.0);
    }
}
