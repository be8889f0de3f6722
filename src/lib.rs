//! Omen: a multi-language source-code quality and risk analysis engine.
//!
//! Layered dataflow (see `pipeline::run`): scanner -> content source ->
//! parser -> per-file analyzers -> graph -> smells/defect -> score composer.
//! History analyzers (churn, coupling, ownership, hotspot) read commits
//! directly from the version-control interface and feed the same composer.
//!
//! The command-line front-end, MCP tool surface, and report renderers are
//! deliberately external to this crate; it exposes typed results only.

pub mod analyzers;
pub mod cancel;
pub mod config;
pub mod defect;
pub mod error;
pub mod graph;
pub mod history;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod score;
pub mod source;
pub mod tdg;
pub mod trend;
pub mod unionfind;

pub use config::OmenConfig;
pub use error::{OmenError, Result};
pub use pipeline::AnalysisReport;
