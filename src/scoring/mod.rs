//! Layout quality scoring.
//!
//! A layout is "topologically faithful" when the natural neighbor structure
//! of its points, as captured by Delaunay triangulation, reproduces the
//! graph's own edges. The score compares the two adjacency structures node by
//! node with the Jaccard index.
//!
//! | Score | Meaning                                                   |
//! |-------|-----------------------------------------------------------|
//! | 1.0   | triangulation reproduces every node's neighborhood exactly |
//! | 0.0   | no node shares a single neighbor between the two graphs    |

mod jaccard;

pub use jaccard::{jaccard_index, jaccard_similarity, node_similarities};

use crate::geometry::{self, GeometryError};
use crate::graph::Graph;
use crate::types::Point;

/// Score a layout of `graph`: similarity(graph, triangulate(points)).
pub fn layout_score(graph: &Graph, points: &[Point]) -> Result<f64, GeometryError> {
    let triangulated = geometry::triangulate(graph, points)?;
    Ok(jaccard_similarity(graph, &triangulated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn cycle(n: usize) -> Graph {
        let mut g = Graph::with_nodes((0..n).map(NodeId::from));
        for i in 0..n {
            g.add_edge(i, (i + 1) % n, 1.0);
        }
        g
    }

    fn polygon(n: usize) -> Vec<Point> {
        (0..n)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                Point::new(100.0 * angle.cos(), 100.0 * angle.sin())
            })
            .collect()
    }

    #[test]
    fn test_pentagon_score_is_reproducible() {
        let g = cycle(5);
        let points = polygon(5);

        let first = layout_score(&g, &points).unwrap();
        for _ in 0..10 {
            let again = layout_score(&g, &points).unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
        assert!(first > 0.0 && first < 1.0);
    }

    #[test]
    fn test_pentagon_score_value() {
        // Boundary edges are always present; the 2 chords add extra neighbors.
        // Chords of a fan touch one apex (degree 4) and two others (degree 3):
        // per-node scores are 2/4 for the apex, 2/3 for the two chord ends,
        // 1.0 for the remaining two nodes.
        let score = layout_score(&cycle(5), &polygon(5)).unwrap();
        let expected = (0.5 + 2.0 / 3.0 + 2.0 / 3.0 + 1.0 + 1.0) / 5.0;
        assert!((score - expected).abs() < 1e-12, "score {score}");
    }

    #[test]
    fn test_triangle_graph_on_triangle_layout_is_perfect() {
        let g = cycle(3);
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert_eq!(layout_score(&g, &points).unwrap(), 1.0);
    }

    #[test]
    fn test_degenerate_layout_fails() {
        let g = cycle(3);
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        assert!(matches!(
            layout_score(&g, &points),
            Err(GeometryError::Degenerate(3))
        ));
    }
}
