//! Graph analyzer (SPEC_FULL.md §4.9).
//!
//! Operates on [`crate::model::graph::DependencyGraph`] via a `petgraph`
//! adjacency structure built once per call and reused across every metric,
//! so repeated calls on the same graph are idempotent and no metric pays
//! twice for graph construction.

pub mod centrality;
pub mod community;
pub mod smells;

use crate::model::graph::{DependencyGraph, NodeIndex as OmenNodeIndex};
use petgraph::graph::{DiGraph, NodeIndex as PgNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

/// A `petgraph::DiGraph` built from a [`DependencyGraph`], with an index
/// mapping back to the model's own `NodeIndex` so callers never need to
/// juggle two numbering schemes.
pub struct PetGraphView {
    pub graph: DiGraph<(), f64>,
    pub to_omen: Vec<OmenNodeIndex>,
    pub from_omen: FxHashMap<u32, PgNodeIndex>,
}

pub fn build_view(dep: &DependencyGraph) -> PetGraphView {
    let mut graph = DiGraph::new();
    let mut to_omen = Vec::with_capacity(dep.node_count());
    let mut from_omen = FxHashMap::default();

    for i in 0..dep.node_count() {
        let omen_idx = OmenNodeIndex(i as u32);
        let pg_idx = graph.add_node(());
        to_omen.push(omen_idx);
        from_omen.insert(i as u32, pg_idx);
    }
    for edge in dep.edges() {
        let from = from_omen[&edge.from.0];
        let to = from_omen[&edge.to.0];
        graph.add_edge(from, to, edge.weight);
    }

    PetGraphView {
        graph,
        to_omen,
        from_omen,
    }
}

/// Connected components of the undirected simple projection.
pub fn connected_components(dep: &DependencyGraph) -> Vec<Vec<OmenNodeIndex>> {
    let n = dep.node_count();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, b) in dep.simple_undirected_pairs() {
        adjacency[a.0 as usize].push(b.0 as usize);
        adjacency[b.0 as usize].push(a.0 as usize);
    }

    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut stack = vec![start];
        visited[start] = true;
        let mut component = Vec::new();
        while let Some(node) = stack.pop() {
            component.push(OmenNodeIndex(node as u32));
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Strongly connected components via Tarjan (`petgraph::algo::tarjan_scc`).
/// SCCs of size > 1 are cycles (SPEC_FULL.md §4.9, §4.10).
pub fn strongly_connected_components(dep: &DependencyGraph) -> Vec<Vec<OmenNodeIndex>> {
    let view = build_view(dep);
    petgraph::algo::tarjan_scc(&view.graph)
        .into_iter()
        .map(|scc| scc.into_iter().map(|pg| view.to_omen[pg.index()]).collect())
        .collect()
}

/// Reciprocity: fraction of directed edges whose reverse also exists.
pub fn reciprocity(dep: &DependencyGraph) -> f64 {
    let mut present = rustc_hash::FxHashSet::default();
    for e in dep.edges() {
        present.insert((e.from.0, e.to.0));
    }
    if present.is_empty() {
        return 0.0;
    }
    let reciprocated = present.iter().filter(|&&(a, b)| present.contains(&(b, a))).count();
    reciprocated as f64 / present.len() as f64
}

/// Local clustering coefficient per node and the global average, on the
/// undirected simple projection.
pub fn clustering_coefficients(dep: &DependencyGraph) -> (Vec<f64>, f64) {
    let n = dep.node_count();
    let mut neighbors: Vec<rustc_hash::FxHashSet<usize>> = vec![rustc_hash::FxHashSet::default(); n];
    for (a, b) in dep.simple_undirected_pairs() {
        neighbors[a.0 as usize].insert(b.0 as usize);
        neighbors[b.0 as usize].insert(a.0 as usize);
    }

    let mut local = vec![0.0; n];
    for i in 0..n {
        let deg = neighbors[i].len();
        if deg < 2 {
            continue;
        }
        let mut links = 0usize;
        let neighbor_list: Vec<usize> = neighbors[i].iter().copied().collect();
        for a in 0..neighbor_list.len() {
            for b in a + 1..neighbor_list.len() {
                if neighbors[neighbor_list[a]].contains(&neighbor_list[b]) {
                    links += 1;
                }
            }
        }
        let possible = deg * (deg - 1) / 2;
        local[i] = links as f64 / possible as f64;
    }
    let global = if n == 0 {
        0.0
    } else {
        local.iter().sum::<f64>() / n as f64
    };
    (local, global)
}

/// Pearson correlation of degree at each directed edge's two endpoints
/// (in-degree + out-degree as the degree measure).
pub fn degree_assortativity(dep: &DependencyGraph) -> f64 {
    let degree = |i: usize| (dep.fan_in(OmenNodeIndex(i as u32)) + dep.fan_out(OmenNodeIndex(i as u32))) as f64;
    let pairs: Vec<(f64, f64)> = dep
        .edges()
        .iter()
        .map(|e| (degree(e.from.0 as usize), degree(e.to.0 as usize)))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let (sum_x, sum_y): (f64, f64) = pairs.iter().fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    let (mean_x, mean_y) = (sum_x / n, sum_y / n);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Diameter and radius via BFS from up to `sample_cap` evenly-sampled
/// nodes (full O(V^2) only when the graph is small enough that "sampled"
/// and "exhaustive" coincide).
pub fn diameter_and_radius(dep: &DependencyGraph, sample_cap: usize) -> (u32, u32) {
    let n = dep.node_count();
    if n == 0 {
        return (0, 0);
    }
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, b) in dep.simple_undirected_pairs() {
        adjacency[a.0 as usize].push(b.0 as usize);
        adjacency[b.0 as usize].push(a.0 as usize);
    }

    let step = (n as f64 / sample_cap as f64).ceil().max(1.0) as usize;
    let sample: Vec<usize> = (0..n).step_by(step).take(sample_cap).collect();

    let mut diameter = 0u32;
    let mut radius = u32::MAX;
    for &start in &sample {
        let mut dist = vec![-1i32; n];
        dist[start] = 0;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(start);
        let mut eccentricity = 0u32;
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if dist[next] == -1 {
                    dist[next] = dist[node] + 1;
                    eccentricity = eccentricity.max(dist[next] as u32);
                    queue.push_back(next);
                }
            }
        }
        diameter = diameter.max(eccentricity);
        radius = radius.min(eccentricity);
    }
    if radius == u32::MAX {
        radius = 0;
    }
    (diameter, radius)
}

/// Retain the top-`max_nodes` by PageRank and the edges among them.
pub fn prune(dep: &DependencyGraph, max_nodes: usize, max_edges: usize) -> DependencyGraph {
    use crate::model::graph::{DependencyGraphBuilder, EdgeKind};

    let ranks = centrality::pagerank(dep, 0.85, 1e-6, 100);
    let mut ranked: Vec<usize> = (0..dep.node_count()).collect();
    ranked.sort_by(|&a, &b| ranks[b].partial_cmp(&ranks[a]).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(max_nodes);
    let keep: rustc_hash::FxHashSet<usize> = ranked.into_iter().collect();

    let mut builder = DependencyGraphBuilder::new();
    for &i in &keep {
        builder.add_node(dep.node(OmenNodeIndex(i as u32)).clone());
    }
    let mut added = 0usize;
    for e in dep.edges() {
        if added >= max_edges {
            break;
        }
        if keep.contains(&(e.from.0 as usize)) && keep.contains(&(e.to.0 as usize)) {
            let from_id = &dep.node(e.from).id;
            let to_id = &dep.node(e.to).id;
            builder.add_edge(from_id.clone(), to_id.clone(), e.kind, e.weight);
            added += 1;
        }
    }
    let _ = EdgeKind::Call;
    builder.build()
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

    fn triangle() -> DependencyGraph {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_node(node("c"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("b", "c", EdgeKind::Call, 1.0);
        b.add_edge("c", "a", EdgeKind::Call, 1.0);
        b.build()
    }

    #[test]
    fn triangle_is_one_connected_component() {
        let g = triangle();
        assert_eq!(connected_components(&g).len(), 1);
    }

    #[test]
    fn directed_cycle_is_one_scc() {
        let g = triangle();
        let sccs = strongly_connected_components(&g);
        assert!(sccs.iter().any(|s| s.len() == 3));
    }

    #[test]
    fn fully_reciprocated_pair_has_reciprocity_one() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("b", "a", EdgeKind::Call, 1.0);
        let g = b.build();
        assert_eq!(reciprocity(&g), 1.0);
    }

    #[test]
    fn prune_keeps_at_most_max_nodes() {
        let g = triangle();
        let pruned = prune(&g, 2, 10);
        assert!(pruned.node_count() <= 2);
    }

    #[test]
    fn diameter_of_triangle_is_one() {
        let g = triangle();
        let (diameter, radius) = diameter_and_radius(&g, 100);
        assert_eq!(diameter, 1);
        assert_eq!(radius, 1);
    }
}
