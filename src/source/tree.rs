//! Commit-tree content source, for historical (trend) analysis.
//!
//! `git2::Repository` is not safe for concurrent use from multiple threads,
//! so reads are serialized behind a mutex (SPEC_FULL.md §5: "internally
//! serialized (mutex) because the underlying tree object is not safe for
//! concurrent use").

use crate::error::ContentError;
use crate::source::ContentSource;
use parking_lot::Mutex;
use std::path::Path;

pub struct TreeSource {
    repo: Mutex<git2::Repository>,
    commit: git2::Oid,
}

impl TreeSource {
    pub fn new(repo: git2::Repository, commit: git2::Oid) -> Self {
        Self {
            repo: Mutex::new(repo),
            commit,
        }
    }
}

impl ContentSource for TreeSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ContentError> {
        let repo = self.repo.lock();
        let commit = repo.find_commit(self.commit).map_err(|_| ContentError::NotFound {
            path: path.to_path_buf(),
        })?;
        let tree = commit.tree().map_err(|_| ContentError::NotFound {
            path: path.to_path_buf(),
        })?;
        let entry = tree.get_path(path).map_err(|_| ContentError::NotFound {
            path: path.to_path_buf(),
        })?;
        let object = entry
            .to_object(&repo)
            .map_err(|_| ContentError::NotFound { path: path.to_path_buf() })?;
        let blob = object
            .as_blob()
            .ok_or_else(|| ContentError::NotFound { path: path.to_path_buf() })?;
        Ok(blob.content().to_vec())
    }
}
