//! Technical Debt Gradient analyzer (SPEC_FULL.md §4.13).
//!
//! A standalone weighted composite, not a restatement of the complexity
//! analyzer: complexity, churn, coupling, duplication and a path-based
//! domain-risk factor are each normalized to a `[0, 5]` gradient, combined,
//! then mapped onto the `[0, 100]` scale the score composer expects.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TdgWeights {
    pub complexity: f64,
    pub churn: f64,
    pub coupling: f64,
    pub domain_risk: f64,
    pub duplication: f64,
}

impl Default for TdgWeights {
    fn default() -> Self {
        Self {
            complexity: 0.30,
            churn: 0.25,
            coupling: 0.20,
            domain_risk: 0.15,
            duplication: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TdgComponents {
    pub complexity: f64,
    pub churn: f64,
    pub coupling: f64,
    pub domain_risk: f64,
    pub duplication: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TdgScore {
    /// Raw gradient in [0, 5]; higher means more debt.
    pub gradient: f64,
    pub components: TdgComponents,
    /// `gradient` mapped onto the composer's [0, 100] convention, where
    /// higher is better (inverse of `gradient`).
    pub scaled: i32,
}

/// Path-based domain risk, scored 0-5 (SPEC_FULL.md §4.13: "test/ generated/
/// vendor paths are lower risk, auth/payment/crypto-named paths are higher
/// risk").
pub fn domain_risk_for_path(path: &Path) -> f64 {
    let text = path.to_string_lossy().to_ascii_lowercase();
    let high_risk = ["auth", "payment", "crypto", "security", "secret"];
    let low_risk = ["test", "tests", "generated", "vendor", "fixtures"];

    if high_risk.iter().any(|k| text.contains(k)) {
        return 4.0;
    }
    if low_risk.iter().any(|k| text.contains(k)) {
        return 0.5;
    }
    2.0
}

/// Gradient-mapping decision (SPEC_FULL.md §9 Open Question): linear inverse
/// scaling, `scaled = round(100 * (1 - gradient / 5))`, clamped to [0, 100].
fn map_gradient_to_scaled(gradient: f64) -> i32 {
    let scaled = 100.0 * (1.0 - gradient / 5.0);
    scaled.round().clamp(0.0, 100.0) as i32
}

pub fn compute(components: TdgComponents, weights: &TdgWeights) -> TdgScore {
    let gradient = (components.complexity * weights.complexity
        + components.churn * weights.churn
        + components.coupling * weights.coupling
        + components.domain_risk * weights.domain_risk
        + components.duplication * weights.duplication)
        .clamp(0.0, 5.0);

    TdgScore {
        gradient,
        components,
        scaled: map_gradient_to_scaled(gradient),
    }
}
