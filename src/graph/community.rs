//! Louvain community detection (SPEC_FULL.md §4.9), on the undirected
//! simple projection. Single-level greedy optimization: repeatedly moves
//! a node into whichever neighboring community most increases modularity,
//! until a full pass makes no move. Good enough for the code-coupling
//! graphs this runs on; a full multi-level Louvain is not implemented.

use crate::model::graph::{DependencyGraph, NodeIndex};
use rustc_hash::FxHashMap;

pub struct CommunityResult {
    pub assignment: Vec<usize>,
    pub modularity: f64,
}

pub fn detect(dep: &DependencyGraph) -> CommunityResult {
    let n = dep.node_count();
    if n == 0 {
        return CommunityResult {
            assignment: Vec::new(),
            modularity: 0.0,
        };
    }

    let mut adjacency: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); n];
    let mut total_weight = 0.0;
    for (a, b) in dep.simple_undirected_pairs() {
        *adjacency[a.0 as usize].entry(b.0 as usize).or_insert(0.0) += 1.0;
        *adjacency[b.0 as usize].entry(a.0 as usize).or_insert(0.0) += 1.0;
        total_weight += 1.0;
    }
    if total_weight == 0.0 {
        return CommunityResult {
            assignment: (0..n).collect(),
            modularity: 0.0,
        };
    }

    let degree: Vec<f64> = adjacency.iter().map(|m| m.values().sum()).collect();
    let two_m = 2.0 * total_weight;
    let mut community: Vec<usize> = (0..n).collect();
    let mut community_degree: Vec<f64> = degree.clone();

    let mut improved = true;
    while improved {
        improved = false;
        for node in 0..n {
            let current = community[node];
            community_degree[current] -= degree[node];

            let mut neighbor_weight: FxHashMap<usize, f64> = FxHashMap::default();
            for (&neighbor, &w) in &adjacency[node] {
                *neighbor_weight.entry(community[neighbor]).or_insert(0.0) += w;
            }

            let mut best_community = current;
            let mut best_gain = neighbor_weight.get(&current).copied().unwrap_or(0.0)
                - community_degree[current] * degree[node] / two_m;

            for (&candidate, &w_to) in &neighbor_weight {
                if candidate == current {
                    continue;
                }
                let gain = w_to - community_degree[candidate] * degree[node] / two_m;
                if gain > best_gain {
                    best_gain = gain;
                    best_community = candidate;
                }
            }

            community[node] = best_community;
            community_degree[best_community] += degree[node];
            if best_community != current {
                improved = true;
            }
        }
    }

    // Relabel to dense 0..k ids.
    let mut relabel: FxHashMap<usize, usize> = FxHashMap::default();
    for &c in &community {
        let next = relabel.len();
        relabel.entry(c).or_insert(next);
    }
    let assignment: Vec<usize> = community.iter().map(|c| relabel[c]).collect();

    let modularity = compute_modularity(&adjacency, &assignment, total_weight);

    CommunityResult {
        assignment,
        modularity,
    }
}

fn compute_modularity(adjacency: &[FxHashMap<usize, f64>], assignment: &[usize], total_weight: f64) -> f64 {
    let n = adjacency.len();
    let degree: Vec<f64> = adjacency.iter().map(|m| m.values().sum()).collect();
    let two_m = 2.0 * total_weight;
    let mut q = 0.0;
    for i in 0..n {
        for (&j, &w) in &adjacency[i] {
            if assignment[i] == assignment[j] {
                q += w - (degree[i] * degree[j]) / two_m;
            }
        }
    }
    q / two_m
}

pub fn node_community(result: &CommunityResult, idx: NodeIndex) -> usize {
    result.assignment[idx.0 as usize]
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
    fn two_disjoint_triangles_form_two_communities() {
        let mut b = DependencyGraphBuilder::new();
        for id in ["a1", "a2", "a3", "b1", "b2", "b3"] {
            b.add_node(node(id));
        }
        for (x, y) in [("a1", "a2"), ("a2", "a3"), ("a3", "a1"), ("b1", "b2"), ("b2", "b3"), ("b3", "b1")] {
            b.add_edge(x, y, EdgeKind::Call, 1.0);
        }
        let g = b.build();
        let result = detect(&g);
        let a_community = node_community(&result, g.index_of("a1").unwrap());
        assert_eq!(a_community, node_community(&result, g.index_of("a2").unwrap()));
        let b_community = node_community(&result, g.index_of("b1").unwrap());
        assert_ne!(a_community, b_community);
        assert!(result.modularity > 0.0);
    }

    #[test]
    fn empty_graph_has_zero_modularity() {
        let g = DependencyGraphBuilder::new().build();
        let result = detect(&g);
        assert_eq!(result.modularity, 0.0);
    }
}
