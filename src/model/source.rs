//! Source file and parse-result value types (SPEC_FULL.md §3, §4.1-§4.3).

use crate::model::Language;
use std::path::PathBuf;

/// A file discovered by the scanner: a logical (workspace-relative) path
/// plus its detected language. Content is read lazily through a
/// `ContentSource`; this struct carries no bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Other);
        Self { path, language }
    }
}

/// A function extracted from a parse result: the unit of complexity
/// analysis and of function-scope graph nodes.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: Option<String>,
    /// Byte range of the function body within the file's source bytes.
    pub body_range: std::ops::Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_detects_language_from_extension() {
        let f = SourceFile::new(PathBuf::from("src/lib.rs"));
        assert_eq!(f.language, Language::Rust);
    }

    #[test]
    fn source_file_with_no_extension_is_other() {
        let f = SourceFile::new(PathBuf::from("Makefile"));
        assert_eq!(f.language, Language::Other);
    }
}
