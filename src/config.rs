//! Flat engine configuration (SPEC_FULL.md §6).
//!
//! This struct is plain data: the core never reads a config file from disk
//! (that is the external loader's job, see SPEC_FULL.md §1); it only
//! validates an already-parsed struct once, at pipeline construction.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmenConfig {
    pub churn_days: u32,
    pub max_file_size: u64,
    pub cyclomatic_complexity_threshold: u32,
    pub cognitive_complexity_threshold: u32,
    pub duplicate: DuplicateConfig,
    pub satd: SatdConfig,
    pub dead_code_confidence: f64,
    pub dead_code: DeadCodeConfig,
    pub exclude: ExcludeConfig,
    pub score: ScoreConfig,
    pub trend: TrendConfig,
}

impl Default for OmenConfig {
    fn default() -> Self {
        Self {
            churn_days: 30,
            max_file_size: 10 * 1024 * 1024,
            cyclomatic_complexity_threshold: 10,
            cognitive_complexity_threshold: 15,
            duplicate: DuplicateConfig::default(),
            satd: SatdConfig::default(),
            dead_code_confidence: 0.8,
            dead_code: DeadCodeConfig::default(),
            exclude: ExcludeConfig::default(),
            score: ScoreConfig::default(),
            trend: TrendConfig::default(),
        }
    }
}

impl OmenConfig {
    /// Validate the configuration once, at pipeline construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.duplicate.validate()?;
        self.score.validate()?;
        self.satd.validate()?;
        if !(0.0..=1.0).contains(&self.dead_code_confidence) {
            return Err(ConfigError::ConfidenceOutOfRange {
                value: self.dead_code_confidence,
            });
        }
        for pattern in &self.exclude.patterns {
            if let Err(e) = globset_pattern_sanity_check(pattern) {
                return Err(ConfigError::InvalidExcludePattern {
                    pattern: pattern.clone(),
                    reason: e,
                });
            }
        }
        Ok(())
    }
}

/// SPEC_FULL.md §4.6. `custom_patterns` are additional regexes unioned with
/// the built-in marker set; each is validated once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatdConfig {
    pub strict: bool,
    pub include_test_files: bool,
    pub custom_patterns: Vec<String>,
}

impl Default for SatdConfig {
    fn default() -> Self {
        Self {
            strict: false,
            include_test_files: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl SatdConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.custom_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::InvalidDebtPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A light sanity check; full gitignore compilation happens in the scanner
/// (which reports the same `ConfigError` variant if `ignore::gitignore`
/// rejects the pattern).
fn globset_pattern_sanity_check(pattern: &str) -> Result<(), String> {
    if pattern.trim().is_empty() {
        return Err("empty pattern".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    pub min_tokens: usize,
    pub similarity_threshold: f64,
    pub shingle_size: usize,
    pub num_hash_functions: usize,
    pub num_bands: usize,
    pub rows_per_band: usize,
    pub normalize_identifiers: bool,
    pub normalize_literals: bool,
    pub ignore_comments: bool,
    pub min_group_size: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_tokens: 50,
            similarity_threshold: 0.80,
            shingle_size: 5,
            num_hash_functions: 200,
            num_bands: 20,
            rows_per_band: 10,
            normalize_identifiers: true,
            normalize_literals: true,
            ignore_comments: true,
            min_group_size: 2,
        }
    }
}

impl DuplicateConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_bands * self.rows_per_band != self.num_hash_functions {
            return Err(ConfigError::BandingMismatch {
                num_hash_functions: self.num_hash_functions,
                num_bands: self.num_bands,
                rows_per_band: self.rows_per_band,
            });
        }
        Ok(())
    }
}

/// SPEC_FULL.md §4.7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadCodeConfig {
    /// Step 3: "optionally, every exported/public definition" joins the
    /// entry-point set, not just main/init/test/benchmark functions.
    pub treat_exported_as_entry_point: bool,
}

impl Default for DeadCodeConfig {
    fn default() -> Self {
        Self {
            treat_exported_as_entry_point: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeConfig {
    pub patterns: Vec<String>,
    pub gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub complexity: f64,
    pub duplication: f64,
    pub satd: f64,
    pub tdg: f64,
    pub coupling: f64,
    pub smells: f64,
    pub cohesion: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            complexity: 0.20,
            duplication: 0.15,
            satd: 0.10,
            tdg: 0.20,
            coupling: 0.15,
            smells: 0.10,
            cohesion: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.complexity
            + self.duplication
            + self.satd
            + self.tdg
            + self.coupling
            + self.smells
            + self.cohesion
    }

    pub fn as_array(&self) -> [f64; 7] {
        [
            self.complexity,
            self.duplication,
            self.satd,
            self.tdg,
            self.coupling,
            self.smells,
            self.cohesion,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub complexity: i32,
    pub duplication: i32,
    pub satd: i32,
    pub tdg: i32,
    pub coupling: i32,
    pub smells: i32,
    pub cohesion: i32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            complexity: 50,
            duplication: 50,
            satd: 50,
            tdg: 50,
            coupling: 50,
            smells: 50,
            cohesion: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub weights: ScoreWeights,
    pub thresholds: ScoreThresholds,
    pub enable_cohesion: bool,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            thresholds: ScoreThresholds::default(),
            enable_cohesion: true,
        }
    }
}

impl ScoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut weights = self.weights.clone();
        // §4.13: when cohesion is enabled but its weight is 0, rescale the
        // rest to leave room for the default cohesion weight.
        if self.enable_cohesion && weights.cohesion == 0.0 {
            let default_cohesion = ScoreWeights::default().cohesion;
            let remaining = 1.0 - default_cohesion;
            let current_rest = weights.sum();
            if current_rest > 0.0 {
                let scale = remaining / current_rest;
                weights.complexity *= scale;
                weights.duplication *= scale;
                weights.satd *= scale;
                weights.tdg *= scale;
                weights.coupling *= scale;
                weights.smells *= scale;
            }
            weights.cohesion = default_cohesion;
        }
        let sum = weights.sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err(ConfigError::WeightsDoNotSumToOne { actual: sum });
        }
        Ok(())
    }

    /// Weights as actually used after the §4.13 cohesion rescaling rule.
    pub fn effective_weights(&self) -> ScoreWeights {
        let mut weights = self.weights.clone();
        if self.enable_cohesion && weights.cohesion == 0.0 {
            let default_cohesion = ScoreWeights::default().cohesion;
            let remaining = 1.0 - default_cohesion;
            let current_rest = weights.sum();
            if current_rest > 0.0 {
                let scale = remaining / current_rest;
                weights.complexity *= scale;
                weights.duplication *= scale;
                weights.satd *= scale;
                weights.tdg *= scale;
                weights.coupling *= scale;
                weights.smells *= scale;
            }
            weights.cohesion = default_cohesion;
        }
        weights
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    pub period: TrendPeriod,
    pub since_days: u32,
    pub snap: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            period: TrendPeriod::Weekly,
            since_days: 180,
            snap: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(OmenConfig::default().validate().is_ok());
    }

    #[test]
    fn banding_mismatch_is_rejected() {
        let mut cfg = OmenConfig::default();
        cfg.duplicate.num_bands = 7;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BandingMismatch { .. })
        ));
    }

    #[test]
    fn weights_must_sum_to_one() {
        let mut cfg = OmenConfig::default();
        cfg.score.weights.complexity = 5.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::WeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn invalid_custom_satd_pattern_is_rejected() {
        let mut cfg = OmenConfig::default();
        cfg.satd.custom_patterns.push("(unclosed".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDebtPattern { .. })
        ));
    }

    #[test]
    fn zero_cohesion_weight_is_rescaled_when_enabled() {
        let mut cfg = OmenConfig::default();
        cfg.score.weights.cohesion = 0.0;
        cfg.score.weights.complexity = 0.30;
        cfg.score.weights.duplication = 0.20;
        cfg.score.weights.satd = 0.15;
        cfg.score.weights.tdg = 0.15;
        cfg.score.weights.coupling = 0.10;
        cfg.score.weights.smells = 0.10;
        assert!(cfg.validate().is_ok());
        let effective = cfg.score.effective_weights();
        assert!((effective.sum() - 1.0).abs() < 0.01);
        assert!(effective.cohesion > 0.0);
    }
}
