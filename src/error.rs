//! Error taxonomy for the analysis engine.
//!
//! Four classes, matching how the pipeline is allowed to react to each:
//! configuration errors abort before any work starts, content errors are
//! absorbed per-file, history errors abort trend runs but degrade churn-only
//! ones, and cancellation is a sentinel that composes with `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration. Reported up-front; the run never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("score weights sum to {actual:.4}, expected 1.0 +/- 0.01")]
    WeightsDoNotSumToOne { actual: f64 },

    #[error("duplicate.num_hash_functions ({num_hash_functions}) must equal num_bands ({num_bands}) * rows_per_band ({rows_per_band})")]
    BandingMismatch {
        num_hash_functions: usize,
        num_bands: usize,
        rows_per_band: usize,
    },

    #[error("invalid exclude pattern {pattern:?}: {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    #[error("invalid SATD pattern {pattern:?}: {reason}")]
    InvalidDebtPattern { pattern: String, reason: String },

    #[error("analysis root {path:?} does not exist or is not a directory")]
    UnreachableRoot { path: PathBuf },

    #[error("dead_code_confidence {value} is out of range [0,1]")]
    ConfidenceOutOfRange { value: f64 },
}

/// Per-file content problems. Logged, the file is dropped, the run continues.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{path:?}: not found")]
    NotFound { path: PathBuf },

    #[error("{path:?}: io error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?}: parse failed: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("{path:?}: exceeds max_file_size")]
    TooLarge { path: PathBuf },
}

/// Version-control problems. Fatal for trend mode, recoverable for churn-only.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{path:?} is not inside a git repository")]
    NotARepository { path: PathBuf },

    #[error("HEAD is detached; trend analysis requires a named branch")]
    DetachedHead,

    #[error("working tree is dirty; trend analysis requires a clean tree")]
    DirtyWorkingTree,

    #[error("commit {hash} not found")]
    CommitNotFound { hash: String },

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Top-level error returned by the pipeline driver.
#[derive(Debug, Error)]
pub enum OmenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("analysis cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, OmenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_transparent_from_omen_error() {
        let err: OmenError = ConfigError::WeightsDoNotSumToOne { actual: 0.5 }.into();
        assert!(matches!(err, OmenError::Config(_)));
        assert!(err.to_string().contains("0.5000"));
    }

    #[test]
    fn cancelled_has_no_payload() {
        let err = OmenError::Cancelled;
        assert_eq!(err.to_string(), "analysis cancelled");
    }
}
