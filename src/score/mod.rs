//! Score composer (SPEC_FULL.md §4.13).

pub mod normalize;

use crate::config::ScoreConfig;
use crate::model::score::{ComponentScores, ScoreResult};
use chrono::Utc;
use std::collections::BTreeMap;

/// Raw, pre-normalization inputs the composer needs from the other
/// analyzers. Each field maps to one row of the SPEC_FULL.md §4.13 table.
#[derive(Debug, Clone, Default)]
pub struct ScoreInputs {
    pub violating_functions: usize,
    pub total_functions: usize,
    pub duplication_ratio: f64,
    pub satd_weighted_per_kloc: f64,
    pub tdg_scaled: i32,
    pub average_instability: f64,
    pub cycle_components: usize,
    pub sdp_violations: usize,
    pub total_components: usize,
    pub weighted_smells: f64,
    pub avg_lcom4: f64,
}

fn names() -> [&'static str; 7] {
    ["complexity", "duplication", "satd", "tdg", "coupling", "smells", "cohesion"]
}

/// Compute all seven component scores, the weighted composite, and
/// per-component threshold pass/fail.
pub fn compose(inputs: &ScoreInputs, config: &ScoreConfig, commit: Option<String>) -> ScoreResult {
    let components = ComponentScores {
        complexity: normalize::complexity(inputs.violating_functions, inputs.total_functions),
        duplication: normalize::duplication(inputs.duplication_ratio),
        satd: normalize::satd(inputs.satd_weighted_per_kloc),
        tdg: inputs.tdg_scaled.clamp(0, 100),
        coupling: normalize::coupling(
            inputs.average_instability,
            inputs.cycle_components,
            inputs.sdp_violations,
            inputs.total_components,
        ),
        smells: normalize::smells(inputs.weighted_smells, inputs.total_components),
        cohesion: normalize::cohesion(inputs.avg_lcom4),
    };

    let weights = config.effective_weights();
    let weight_vec = weights.as_array();
    let component_vec = components.as_array();

    let dot: f64 = component_vec.iter().zip(weight_vec.iter()).map(|(&c, &w)| c as f64 * w).sum();
    let composite = dot.round().clamp(0.0, 100.0) as i32;

    let threshold_vec = [
        config.thresholds.complexity,
        config.thresholds.duplication,
        config.thresholds.satd,
        config.thresholds.tdg,
        config.thresholds.coupling,
        config.thresholds.smells,
        config.thresholds.cohesion,
    ];

    let mut threshold_pass = BTreeMap::new();
    for ((name, &score), &min) in names().iter().zip(component_vec.iter()).zip(threshold_vec.iter()) {
        threshold_pass.insert(name.to_string(), score >= min);
    }

    ScoreResult {
        components,
        composite,
        weights: weight_vec,
        threshold_pass,
        generated_at: Utc::now(),
        commit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_inputs_yield_a_perfect_composite() {
        let inputs = ScoreInputs {
            violating_functions: 0,
            total_functions: 10,
            duplication_ratio: 0.0,
            satd_weighted_per_kloc: 0.0,
            tdg_scaled: 100,
            average_instability: 0.0,
            cycle_components: 0,
            sdp_violations: 0,
            total_components: 10,
            weighted_smells: 0.0,
            avg_lcom4: 1.0,
        };
        let result = compose(&inputs, &ScoreConfig::default(), None);
        assert_eq!(result.composite, 100);
        assert!(result.passed());
    }

    #[test]
    fn composite_is_bounded_for_worst_case_inputs() {
        let inputs = ScoreInputs {
            violating_functions: 10,
            total_functions: 10,
            duplication_ratio: 1.0,
            satd_weighted_per_kloc: 1000.0,
            tdg_scaled: 0,
            average_instability: 1.0,
            cycle_components: 10,
            sdp_violations: 10,
            total_components: 10,
            weighted_smells: 100.0,
            avg_lcom4: 20.0,
        };
        let result = compose(&inputs, &ScoreConfig::default(), None);
        assert!(result.composite >= 0 && result.composite <= 100);
        assert!(!result.passed());
    }

    #[test]
    fn below_threshold_component_fails_the_run() {
        let mut config = ScoreConfig::default();
        config.thresholds.complexity = 101;
        let inputs = ScoreInputs {
            total_functions: 10,
            total_components: 10,
            avg_lcom4: 1.0,
            tdg_scaled: 100,
            ..Default::default()
        };
        let result = compose(&inputs, &config, None);
        assert!(!result.passed());
    }
}
