//! The analysis engine's value types (SPEC_FULL.md §3).
//!
//! Everything here is a plain value produced by a single analysis run; none
//! of it persists across runs.

pub mod clone;
pub mod commit;
pub mod debt;
pub mod graph;
pub mod score;
pub mod source;

/// The closed language set (SPEC_FULL.md §3). Derived from file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Other,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "go" => Language::Go,
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "ts" | "tsx" => Language::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            _ => Language::Other,
        }
    }

    pub fn is_object_oriented_capable(&self) -> bool {
        matches!(
            self,
            Language::Java | Language::CSharp | Language::Python | Language::Ruby | Language::TypeScript
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_maps_to_language() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("xyz"), Language::Other);
    }
}
