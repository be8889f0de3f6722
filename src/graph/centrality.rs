//! Centrality measures (SPEC_FULL.md §4.9).

use crate::model::graph::{DependencyGraph, NodeIndex};
use std::collections::VecDeque;

/// Sparse power-iteration PageRank. O(E * iterations), dangling nodes
/// distribute their rank uniformly across all nodes.
pub fn pagerank(dep: &DependencyGraph, damping: f64, tolerance: f64, max_iterations: usize) -> Vec<f64> {
    let n = dep.node_count();
    if n == 0 {
        return Vec::new();
    }
    let mut ranks = vec![1.0 / n as f64; n];
    let out_degree: Vec<usize> = (0..n).map(|i| dep.fan_out(NodeIndex(i as u32))).collect();

    for _ in 0..max_iterations {
        let dangling_mass: f64 = (0..n).filter(|&i| out_degree[i] == 0).map(|i| ranks[i]).sum();
        let mut next = vec![(1.0 - damping) / n as f64; n];
        for i in 0..n {
            next[i] += damping * dangling_mass / n as f64;
        }
        for i in 0..n {
            if out_degree[i] == 0 {
                continue;
            }
            let share = damping * ranks[i] / out_degree[i] as f64;
            for edge in dep.outgoing_edges(NodeIndex(i as u32)) {
                next[edge.to.0 as usize] += share;
            }
        }
        let delta: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
        ranks = next;
        if delta < tolerance {
            break;
        }
    }
    ranks
}

/// Eigenvector centrality via power iteration on the undirected simple
/// projection, L2-normalized each iteration.
pub fn eigenvector_centrality(dep: &DependencyGraph, max_iterations: usize) -> Vec<f64> {
    let n = dep.node_count();
    if n == 0 {
        return Vec::new();
    }
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, b) in dep.simple_undirected_pairs() {
        adjacency[a.0 as usize].push(b.0 as usize);
        adjacency[b.0 as usize].push(a.0 as usize);
    }

    let mut scores = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..max_iterations {
        let mut next = vec![0.0; n];
        for i in 0..n {
            for &j in &adjacency[i] {
                next[i] += scores[j];
            }
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut next {
                *v /= norm;
            }
        }
        scores = next;
    }
    scores
}

struct ShortestPaths {
    distances: Vec<Vec<u32>>,
}

fn all_pairs_bfs(dep: &DependencyGraph) -> ShortestPaths {
    let n = dep.node_count();
    let mut distances = vec![vec![u32::MAX; n]; n];
    for start in 0..n {
        let mut dist = vec![u32::MAX; n];
        dist[start] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            for edge in dep.outgoing_edges(NodeIndex(node as u32)) {
                let next = edge.to.0 as usize;
                if dist[next] == u32::MAX {
                    dist[next] = dist[node] + 1;
                    queue.push_back(next);
                }
            }
        }
        distances[start] = dist;
    }
    ShortestPaths { distances }
}

/// Betweenness (Brandes-style counting via unweighted shortest paths),
/// closeness (1 / average distance to reachable nodes), and harmonic
/// (sum of 1/distance) centralities, computed from one shared all-pairs
/// BFS pass.
pub fn betweenness_closeness_harmonic(dep: &DependencyGraph) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = dep.node_count();
    if n == 0 {
        return (Vec::new(), Vec::new(), Vec::new());
    }
    let paths = all_pairs_bfs(dep);

    let mut closeness = vec![0.0; n];
    let mut harmonic = vec![0.0; n];
    for v in 0..n {
        let mut reachable = 0usize;
        let mut sum_dist = 0u64;
        for u in 0..n {
            if u == v {
                continue;
            }
            let d = paths.distances[u][v];
            if d != u32::MAX && d > 0 {
                reachable += 1;
                sum_dist += d as u64;
                harmonic[v] += 1.0 / d as f64;
            }
        }
        if reachable > 0 {
            closeness[v] = reachable as f64 / sum_dist as f64;
        }
    }

    // Betweenness: for every shortest path source, count how often each
    // intermediate node lies on *a* shortest path (not fractional
    // shortest-path counting — a documented simplification for an
    // unweighted graph without path multiplicity tracking).
    let mut betweenness = vec![0.0; n];
    for s in 0..n {
        for t in 0..n {
            if s == t {
                continue;
            }
            let d_st = paths.distances[s][t];
            if d_st == u32::MAX {
                continue;
            }
            for v in 0..n {
                if v == s || v == t {
                    continue;
                }
                let d_sv = paths.distances[s][v];
                let d_vt = paths.distances[v][t];
                if d_sv != u32::MAX && d_vt != u32::MAX && d_sv + d_vt == d_st {
                    betweenness[v] += 1.0;
                }
            }
        }
    }

    (betweenness, closeness, harmonic)
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
    fn pagerank_sums_to_approximately_one() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_node(node("c"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("b", "c", EdgeKind::Call, 1.0);
        b.add_edge("c", "a", EdgeKind::Call, 1.0);
        let g = b.build();
        let ranks = pagerank(&g, 0.85, 1e-6, 100);
        let sum: f64 = ranks.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "sum was {sum}");
    }

    #[test]
    fn dangling_node_does_not_lose_rank_mass() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        let g = b.build();
        let ranks = pagerank(&g, 0.85, 1e-6, 100);
        let sum: f64 = ranks.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "sum was {sum}");
    }

    #[test]
    fn center_of_star_has_highest_betweenness() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("center"));
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_node(node("c"));
        for leaf in ["a", "b", "c"] {
            b.add_edge("center", leaf, EdgeKind::Call, 1.0);
            b.add_edge(leaf, "center", EdgeKind::Call, 1.0);
        }
        let g = b.build();
        let (betweenness, _, _) = betweenness_closeness_harmonic(&g);
        let center_idx = g.index_of("center").unwrap().0 as usize;
        let a_idx = g.index_of("a").unwrap().0 as usize;
        assert!(betweenness[center_idx] >= betweenness[a_idx]);
    }
}
