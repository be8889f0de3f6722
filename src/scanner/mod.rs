//! File scanner (SPEC_FULL.md §4.1).
//!
//! Walks a root, applies gitignore semantics plus an excluded-directory set,
//! and enforces the symlink-escape security boundary: a symlink whose
//! resolved target falls outside the scan root is dropped, never yielded.

use crate::config::ExcludeConfig;
use crate::model::source::SourceFile;
use crate::model::Language;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    "target",
];

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub max_depth: Option<usize>,
    pub max_file_size: Option<u64>,
    pub excluded_dirs: Vec<String>,
    pub exclude: ExcludeConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(64),
            max_file_size: Some(10 * 1024 * 1024),
            excluded_dirs: EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude: ExcludeConfig {
                patterns: Vec::new(),
                gitignore: true,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    pub dropped_for_size: usize,
}

/// Resolve a symlink and check the result stays within `root`.
/// Unresolvable symlinks are dropped silently, matching SPEC_FULL.md §4.1.
fn symlink_target_escapes_root(path: &Path, root: &Path) -> bool {
    match std::fs::canonicalize(path) {
        Ok(resolved) => match std::fs::canonicalize(root) {
            Ok(canon_root) => !resolved.starts_with(&canon_root),
            Err(_) => true,
        },
        Err(_) => true,
    }
}

pub fn scan(root: &Path, config: &ScanConfig) -> ScanResult {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(config.exclude.gitignore)
        .git_ignore(config.exclude.gitignore)
        .git_global(config.exclude.gitignore)
        .git_exclude(config.exclude.gitignore)
        .parents(config.exclude.gitignore)
        .follow_links(false)
        .max_depth(config.max_depth);

    if !config.exclude.patterns.is_empty() {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in &config.exclude.patterns {
            // OverrideBuilder patterns are whitelists unless negated, so a
            // gitignore-style exclude pattern becomes a `!pattern` entry.
            if let Err(err) = overrides.add(&format!("!{pattern}")) {
                warn!(pattern = %pattern, error = %err, "invalid exclude pattern, skipping");
            }
        }
        match overrides.build() {
            Ok(overrides) => {
                builder.overrides(overrides);
            }
            Err(err) => warn!(error = %err, "failed to build exclude overrides"),
        }
    }

    let excluded_dirs = config.excluded_dirs.clone();
    builder.filter_entry(move |entry| {
        if let Some(name) = entry.file_name().to_str() {
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
                && excluded_dirs.iter().any(|d| d == name)
            {
                return false;
            }
        }
        true
    });

    let canonical_root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut files = Vec::new();
    let mut dropped_for_size = 0usize;

    for entry in builder.build() {
        let Ok(entry) = entry else { continue };
        let Some(file_type) = entry.file_type() else { continue };
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }
        let path = entry.path();

        if file_type.is_symlink() && symlink_target_escapes_root(path, &canonical_root) {
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if Language::from_extension(ext) == Language::Other {
            continue;
        }

        if let Some(max_size) = config.max_file_size {
            if max_size > 0 {
                if let Ok(meta) = entry.metadata() {
                    if meta.len() > max_size {
                        dropped_for_size += 1;
                        continue;
                    }
                }
            }
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        files.push(SourceFile::new(relative));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    ScanResult {
        files,
        dropped_for_size,
    }
}

/// SPEC_FULL.md §8 invariant: scan(root, c) never yields a path whose
/// resolved location escapes root. Exposed for use by integration tests
/// that want to assert this directly against arbitrary scan output.
pub fn verify_no_escape(root: &Path, files: &[SourceFile]) -> bool {
    let canonical_root = match std::fs::canonicalize(root) {
        Ok(r) => r,
        Err(_) => return true,
    };
    files.iter().all(|f| {
        let full = root.join(&f.path);
        match std::fs::canonicalize(&full) {
            Ok(resolved) => resolved.starts_with(&canonical_root),
            Err(_) => true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scans_known_language_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), b"fn main() {}").unwrap();
        fs::write(dir.path().join("README.md"), b"# hi").unwrap();
        let result = scan(dir.path(), &ScanConfig::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, PathBuf::from("a.rs"));
    }

    #[test]
    fn skips_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/lib.js"), b"1").unwrap();
        fs::write(dir.path().join("main.js"), b"1").unwrap();
        let result = scan(dir.path(), &ScanConfig::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, PathBuf::from("main.js"));
    }

    #[test]
    fn drops_files_over_size_cap() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.rs"), vec![b'a'; 100]).unwrap();
        let mut config = ScanConfig::default();
        config.max_file_size = Some(10);
        let result = scan(dir.path(), &config);
        assert_eq!(result.files.len(), 0);
        assert_eq!(result.dropped_for_size, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_not_yielded() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("elsewhere.rs"), b"fn x() {}").unwrap();

        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("in")).unwrap();
        symlink(outside.path().join("elsewhere.rs"), root.path().join("in/out.rs")).unwrap();
        fs::write(root.path().join("normal.rs"), b"fn y() {}").unwrap();

        let result = scan(root.path(), &ScanConfig::default());
        assert!(verify_no_escape(root.path(), &result.files));
        assert!(result.files.iter().all(|f| f.path != PathBuf::from("in/out.rs")));
        assert!(result.files.iter().any(|f| f.path == PathBuf::from("normal.rs")));
    }
}
