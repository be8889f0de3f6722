//! Ordinary filesystem content source.

use crate::error::ContentError;
use crate::source::ContentSource;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FilesystemSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ContentError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ContentError::NotFound { path: path.to_path_buf() }
            } else {
                ContentError::Io { path: path.to_path_buf(), source }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), b"fn main() {}").unwrap();
        let source = FilesystemSource::new(dir.path());
        let bytes = source.read(Path::new("a.rs")).unwrap();
        assert_eq!(bytes, b"fn main() {}");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilesystemSource::new(dir.path());
        let err = source.read(Path::new("missing.rs")).unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }
}
