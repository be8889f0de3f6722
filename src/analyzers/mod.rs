//! Per-file analyzers (SPEC_FULL.md §4.4-§4.10).
//!
//! Each analyzer takes a parsed file (or, for duplication/SATD, raw bytes)
//! and produces an independent result; the score composer combines them
//! afterward. A file that fails one analyzer is skipped only for that
//! analyzer, never for the whole run.

pub mod complexity;
pub mod duplicates;
pub mod satd;
pub mod dead_code;
pub mod cohesion;
