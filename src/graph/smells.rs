//! Architectural-smell detector (SPEC_FULL.md §4.10).

use crate::graph::strongly_connected_components;
use crate::model::graph::{DependencyGraph, NodeIndex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Smell {
    CyclicDependency { members: Vec<String>, severity: Severity },
    HubLikeComponent { node: String, fan_in: usize, fan_out: usize, severity: Severity },
    GodComponent { node: String, fan_in: usize, fan_out: usize, severity: Severity },
    UnstableDependency { from: String, to: String, instability_from: f64, instability_to: f64, severity: Severity },
}

#[derive(Debug, Clone)]
pub struct SmellThresholds {
    pub hub_threshold: usize,
    pub god_fan_in_threshold: usize,
    pub god_fan_out_threshold: usize,
    pub instability_difference: f64,
}

impl Default for SmellThresholds {
    fn default() -> Self {
        Self {
            hub_threshold: 20,
            god_fan_in_threshold: 10,
            god_fan_out_threshold: 10,
            instability_difference: 0.4,
        }
    }
}

fn instability(dep: &DependencyGraph, idx: NodeIndex) -> f64 {
    let fan_in = dep.fan_in(idx) as f64;
    let fan_out = dep.fan_out(idx) as f64;
    if fan_in + fan_out == 0.0 {
        0.0
    } else {
        fan_out / (fan_in + fan_out)
    }
}

pub fn detect(dep: &DependencyGraph, thresholds: &SmellThresholds) -> Vec<Smell> {
    let mut smells = Vec::new();

    for scc in strongly_connected_components(dep) {
        if scc.len() > 1 {
            smells.push(Smell::CyclicDependency {
                members: scc.iter().map(|idx| dep.node(*idx).id.clone()).collect(),
                severity: Severity::Critical,
            });
        }
    }

    for i in 0..dep.node_count() {
        let idx = NodeIndex(i as u32);
        let fan_in = dep.fan_in(idx);
        let fan_out = dep.fan_out(idx);
        let node = &dep.node(idx).id;

        if fan_in + fan_out > thresholds.hub_threshold && fan_in >= 3 {
            smells.push(Smell::HubLikeComponent {
                node: node.clone(),
                fan_in,
                fan_out,
                severity: Severity::High,
            });
        }
        if fan_in > thresholds.god_fan_in_threshold && fan_out > thresholds.god_fan_out_threshold {
            smells.push(Smell::GodComponent {
                node: node.clone(),
                fan_in,
                fan_out,
                severity: Severity::Critical,
            });
        }
    }

    for edge in dep.edges() {
        let i_from = instability(dep, edge.from);
        let i_to = instability(dep, edge.to);
        if i_from < 0.3 && i_to > 0.7 && (i_to - i_from) > thresholds.instability_difference {
            smells.push(Smell::UnstableDependency {
                from: dep.node(edge.from).id.clone(),
                to: dep.node(edge.to).id.clone(),
                instability_from: i_from,
                instability_to: i_to,
                severity: Severity::Medium,
            });
        }
    }

    smells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::{DependencyGraphBuilder, EdgeKind, GraphNode, NodeKind};
    use std::collections::BTreeMap;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            name: id.to_string(),
            kind: NodeKind::Function,
            file: "f.rs".to_string(),
            line: None,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn three_node_cycle_is_flagged_critical() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_node(node("c"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("b", "c", EdgeKind::Call, 1.0);
        b.add_edge("c", "a", EdgeKind::Call, 1.0);
        let g = b.build();
        let smells = detect(&g, &SmellThresholds::default());
        assert!(smells.iter().any(|s| matches!(s, Smell::CyclicDependency { severity: Severity::Critical, .. })));
    }

    #[test]
    fn pure_consumer_with_high_fan_out_is_not_flagged_as_hub() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("consumer"));
        for i in 0..25 {
            let callee = format!("callee{i}");
            b.add_node(node(&callee));
            b.add_edge("consumer", callee, EdgeKind::Call, 1.0);
        }
        let g = b.build();
        let smells = detect(&g, &SmellThresholds::default());
        assert!(!smells.iter().any(|s| matches!(s, Smell::HubLikeComponent { node, .. } if node == "consumer")));
    }
}
