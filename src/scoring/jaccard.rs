//! Jaccard similarity over node neighborhoods.

use std::collections::HashSet;
use std::hash::Hash;

use crate::graph::Graph;

/// |a ∩ b| / |a ∪ b|, with two empty sets counting as identical (1.0).
pub fn jaccard_index<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Per-node Jaccard index of the neighbor sets in `reference` and `candidate`.
///
/// Indexed by node position of `reference`. Nodes past the end of
/// `candidate` have no candidate neighbors.
pub fn node_similarities(reference: &Graph, candidate: &Graph) -> Vec<f64> {
    (0..reference.node_count())
        .map(|v| jaccard_index(&reference.neighbors(v), &candidate.neighbors(v)))
        .collect()
}

/// Mean per-node Jaccard index, in [0, 1].
///
/// A node isolated in both graphs scores 1.0: it violates no structure.
/// An empty reference graph scores 1.0 for the same reason.
pub fn jaccard_similarity(reference: &Graph, candidate: &Graph) -> f64 {
    let per_node = node_similarities(reference, candidate);
    if per_node.is_empty() {
        return 1.0;
    }
    per_node.iter().sum::<f64>() / per_node.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Graph {
        let mut g = Graph::with_nodes((0..n).map(NodeId::from));
        for &(a, b) in edges {
            g.add_edge(a, b, 1.0);
        }
        g
    }

    #[test]
    fn test_jaccard_index_basic() {
        let a = HashSet::from([1, 2, 3]);
        let b = HashSet::from([2, 3, 4]);
        assert_eq!(jaccard_index(&a, &b), 0.5);
        assert_eq!(jaccard_index(&a, &a), 1.0);
        assert_eq!(jaccard_index(&a, &HashSet::new()), 0.0);
    }

    #[test]
    fn test_jaccard_index_both_empty() {
        let empty: HashSet<usize> = HashSet::new();
        assert_eq!(jaccard_index(&empty, &empty), 1.0);
    }

    #[test]
    fn test_identical_graphs_score_one() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
        let s = graph(4, &[(0, 2), (3, 0), (2, 3), (1, 2), (0, 1)]);
        assert!(node_similarities(&g, &s).iter().all(|&v| v == 1.0));
        assert_eq!(jaccard_similarity(&g, &s), 1.0);
    }

    #[test]
    fn test_edgeless_candidate_scores_zero() {
        let g = graph(4, &[(0, 1), (2, 3)]);
        let s = graph(4, &[]);
        assert_eq!(jaccard_similarity(&g, &s), 0.0);
    }

    #[test]
    fn test_doubly_isolated_node_scores_one() {
        // Node 2 has no neighbors in either graph.
        let g = graph(3, &[(0, 1)]);
        let s = graph(3, &[(0, 1)]);
        let per_node = node_similarities(&g, &s);
        assert_eq!(per_node, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_partial_overlap() {
        // Node 0: G {1}, S {1, 2} -> 1/2
        // Node 1: G {0}, S {0}    -> 1
        // Node 2: G {},  S {0}    -> 0
        let g = graph(3, &[(0, 1)]);
        let s = graph(3, &[(0, 1), (0, 2)]);
        assert_eq!(node_similarities(&g, &s), vec![0.5, 1.0, 0.0]);
        assert_eq!(jaccard_similarity(&g, &s), 0.5);
    }

    #[test]
    fn test_weights_are_ignored() {
        let g = graph(2, &[(0, 1)]);
        let mut s = graph(2, &[]);
        s.add_edge(0, 1, 30.0);
        assert_eq!(jaccard_similarity(&g, &s), 1.0);
    }

    #[test]
    fn test_empty_reference() {
        assert_eq!(jaccard_similarity(&Graph::new(), &Graph::new()), 1.0);
    }
}
