//! Undirected graph storage shared by the loader, triangulation and scoring.
//!
//! Nodes are addressed two ways: by [`NodeId`] (the identifier from the input
//! file) and by position (`usize`, the order nodes were added). Position is
//! what ties a graph to a coordinate set: the i-th point belongs to the i-th
//! node.

mod node_link;

pub use node_link::{load_node_link, parse_node_link};

use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::types::NodeId;

/// Simple undirected graph: at most one edge per node pair, self-loops allowed.
///
/// Adding an edge that already exists replaces its weight.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: UnGraph<NodeId, f64>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an edgeless graph over the given nodes, in order.
    pub fn with_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut graph = Self::new();
        for id in nodes {
            graph.add_node(id);
        }
        graph
    }

    /// Edgeless graph over the same node set (and order) as `self`.
    pub fn empty_like(&self) -> Self {
        Self::with_nodes(self.nodes().cloned())
    }

    /// Add a node, returns its position.
    /// Idempotent - returns the existing position if already present.
    pub fn add_node(&mut self, id: NodeId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx.index();
        }
        let idx = self.graph.add_node(id.clone());
        self.index.insert(id, idx);
        idx.index()
    }

    /// Add (or reweight) the edge between two node positions.
    ///
    /// Panics if either position is out of range, like slice indexing.
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        assert!(
            a < self.node_count() && b < self.node_count(),
            "edge ({a}, {b}) out of range for {} nodes",
            self.node_count()
        );
        self.graph
            .update_edge(NodeIndex::new(a), NodeIndex::new(b), weight);
    }

    /// Add an edge by node identifier, creating missing nodes on the way.
    pub fn add_edge_between(&mut self, a: NodeId, b: NodeId, weight: f64) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.add_edge(a, b, weight);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node identifiers in position order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.graph.node_weights()
    }

    pub fn node_id(&self, position: usize) -> Option<&NodeId> {
        self.graph.node_weight(NodeIndex::new(position))
    }

    pub fn position_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).map(|idx| idx.index())
    }

    /// Neighbor positions of a node. A self-loop makes the node its own neighbor.
    pub fn neighbors(&self, position: usize) -> HashSet<usize> {
        if position >= self.node_count() {
            return HashSet::new();
        }
        self.graph
            .neighbors(NodeIndex::new(position))
            .map(|n| n.index())
            .collect()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        if a >= self.node_count() || b >= self.node_count() {
            return false;
        }
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .is_some()
    }

    /// All edges as (position, position, weight), lower position first.
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source().index(), e.target().index());
                (a.min(b), a.max(b), *e.weight())
            })
            .collect()
    }

    /// Mean node degree (a self-loop counts twice), 0.0 for an empty graph.
    pub fn average_degree(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        2.0 * self.edge_count() as f64 / self.node_count() as f64
    }

    /// True when both graphs hold the same identifiers in the same positions.
    pub fn same_nodes_as(&self, other: &Graph) -> bool {
        self.node_count() == other.node_count() && self.nodes().eq(other.nodes())
    }
}
