//! Dependency graph value type (SPEC_FULL.md §3, §4.9).
//!
//! Per the redesign note in SPEC_FULL.md §9 ("cyclic graphs of nodes and
//! edges"), this is a pair of flat collections (nodes, edges) plus derived
//! indices, not a graph of heap-linked node objects. The graph owns its
//! nodes and edges; every algorithm borrows it. Node identity inside the
//! graph is a `NodeIndex` assigned at construction time, not the string ID
//! used by callers to build the graph.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Most nodes in the code-coupling graphs this engine builds have a small
/// handful of callers/callees; inline a few edge indices before spilling
/// to the heap.
type EdgeIndices = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Function,
    Class,
    Module,
    Package,
    Trait,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Import,
    Call,
    Inherit,
    Implement,
    Reference,
    Uses,
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    /// String ID unique within the graph, as supplied by the caller.
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub file: String,
    pub line: Option<u32>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub kind: EdgeKind,
    pub weight: f64,
}

/// A dependency/call graph: flat node and edge vectors plus a name→index
/// lookup and a per-node outgoing-edge index, both rebuilt whenever the
/// graph is finalized via [`DependencyGraph::build`].
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    id_to_index: FxHashMap<String, NodeIndex>,
    outgoing: Vec<EdgeIndices>,
    incoming: Vec<EdgeIndices>,
}

/// Builder that accumulates nodes/edges by string ID before the graph is
/// finalized into index form. Mirrors how the scanner/parser discover nodes
/// before call/import resolution can run.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    nodes: Vec<GraphNode>,
    id_to_index: FxHashMap<String, usize>,
    pending_edges: Vec<(String, String, EdgeKind, f64)>,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if its ID is not already present; returns its index.
    pub fn add_node(&mut self, node: GraphNode) -> usize {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.id_to_index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        idx
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Queue an edge by node ID. Both endpoints must be added via
    /// [`add_node`] before [`build`] is called; multi-edges between the same
    /// ordered pair are permitted (SPEC_FULL.md §3 invariant).
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>, kind: EdgeKind, weight: f64) {
        self.pending_edges.push((from.into(), to.into(), kind, weight));
    }

    /// Finalize into index form. Edges whose endpoints were never added via
    /// `add_node` are dropped (the builder enforces the "every edge endpoint
    /// ID appears in the node set" invariant by construction rather than by
    /// runtime check).
    pub fn build(self) -> DependencyGraph {
        let id_to_index: FxHashMap<String, NodeIndex> = self
            .id_to_index
            .iter()
            .map(|(id, &idx)| (id.clone(), NodeIndex(idx as u32)))
            .collect();

        let mut edges = Vec::with_capacity(self.pending_edges.len());
        for (from, to, kind, weight) in self.pending_edges {
            if let (Some(&from_idx), Some(&to_idx)) =
                (self.id_to_index.get(&from), self.id_to_index.get(&to))
            {
                edges.push(GraphEdge {
                    from: NodeIndex(from_idx as u32),
                    to: NodeIndex(to_idx as u32),
                    kind,
                    weight,
                });
            }
        }

        let n = self.nodes.len();
        let mut outgoing: Vec<EdgeIndices> = vec![SmallVec::new(); n];
        let mut incoming: Vec<EdgeIndices> = vec![SmallVec::new(); n];
        for (i, e) in edges.iter().enumerate() {
            outgoing[e.from.0 as usize].push(i);
            incoming[e.to.0 as usize].push(i);
        }

        DependencyGraph {
            nodes: self.nodes,
            edges,
            id_to_index,
            outgoing,
            incoming,
        }
    }
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.nodes[idx.0 as usize]
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn outgoing_edges(&self, idx: NodeIndex) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing[idx.0 as usize].iter().map(move |&i| &self.edges[i])
    }

    pub fn incoming_edges(&self, idx: NodeIndex) -> impl Iterator<Item = &GraphEdge> {
        self.incoming[idx.0 as usize].iter().map(move |&i| &self.edges[i])
    }

    pub fn fan_out(&self, idx: NodeIndex) -> usize {
        self.outgoing[idx.0 as usize].len()
    }

    pub fn fan_in(&self, idx: NodeIndex) -> usize {
        self.incoming[idx.0 as usize].len()
    }

    pub fn filter_by_edge_kind(&self, kind: EdgeKind) -> Vec<&GraphEdge> {
        self.edges.iter().filter(|e| e.kind == kind).collect()
    }

    /// Distinct (from, to) pairs ignoring edge kind/weight, self-loops
    /// excluded — the "simple-graph projection" used by community detection
    /// and PageRank (SPEC_FULL.md §3 invariant).
    pub fn simple_undirected_pairs(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut pairs = Vec::new();
        for e in &self.edges {
            if e.from == e.to {
                continue;
            }
            let key = if e.from.0 <= e.to.0 {
                (e.from, e.to)
            } else {
                (e.to, e.from)
            };
            if seen.insert(key) {
                pairs.push(key);
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn builder_drops_edges_with_unknown_endpoints() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_edge("a", "ghost", EdgeKind::Call, 1.0);
        let g = b.build();
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn multi_edges_between_same_pair_are_kept() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        let g = b.build();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.simple_undirected_pairs().len(), 1);
    }

    #[test]
    fn self_loops_are_excluded_from_simple_projection() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_edge("a", "a", EdgeKind::Call, 1.0);
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        assert!(g.simple_undirected_pairs().is_empty());
    }

    #[test]
    fn fan_in_and_fan_out_are_tracked() {
        let mut b = DependencyGraphBuilder::new();
        b.add_node(node("a"));
        b.add_node(node("b"));
        b.add_node(node("c"));
        b.add_edge("a", "b", EdgeKind::Call, 1.0);
        b.add_edge("c", "b", EdgeKind::Call, 1.0);
        let g = b.build();
        let b_idx = g.index_of("b").unwrap();
        assert_eq!(g.fan_in(b_idx), 2);
        assert_eq!(g.fan_out(b_idx), 0);
    }
}
