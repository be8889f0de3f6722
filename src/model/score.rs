//! Score result value type (SPEC_FULL.md §3, §4.13).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentScores {
    pub complexity: i32,
    pub duplication: i32,
    pub satd: i32,
    pub tdg: i32,
    pub coupling: i32,
    pub smells: i32,
    pub cohesion: i32,
}

impl ComponentScores {
    pub fn as_array(&self) -> [i32; 7] {
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
pub struct ScoreResult {
    pub components: ComponentScores,
    pub composite: i32,
    pub weights: [f64; 7],
    pub threshold_pass: BTreeMap<String, bool>,
    pub generated_at: DateTime<Utc>,
    pub commit: Option<String>,
}

impl ScoreResult {
    pub fn passed(&self) -> bool {
        self.threshold_pass.values().all(|&p| p)
    }
}
