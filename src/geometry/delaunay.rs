//! Delaunay triangulation of node coordinates.
//!
//! The predicates are delegated to `spade`, which uses robust orientation and
//! in-circle tests. The resulting triangles are turned back into a graph over
//! the original node set: two nodes are adjacent iff they share a triangle.

use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};

use super::GeometryError;
use crate::graph::Graph;
use crate::types::Point;

/// Weight of every edge in a triangulated graph.
///
/// The similarity score reads adjacency only, never weights.
pub const EDGE_WEIGHT: f64 = 30.0;

/// A point tagged with the position of the node it belongs to.
#[derive(Debug, Clone, Copy)]
struct NodePoint {
    position: usize,
    point: Point2<f64>,
}

impl HasPosition for NodePoint {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.point
    }
}

/// Triangles of the Delaunay triangulation, as triples of point positions.
///
/// Coincident points share one vertex; the first of them keeps it and the
/// rest appear in no triangle.
pub fn triangles(points: &[Point]) -> Result<Vec<[usize; 3]>, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints(points.len()));
    }

    let mut triangulation: DelaunayTriangulation<NodePoint> = DelaunayTriangulation::new();

    for (position, p) in points.iter().enumerate() {
        let invalid = GeometryError::InvalidCoordinate {
            position,
            x: p.x,
            y: p.y,
        };
        if !p.is_finite() {
            return Err(invalid);
        }

        let point = Point2::new(p.x, p.y);
        if triangulation.locate_vertex(point).is_some() {
            tracing::debug!(position, x = p.x, y = p.y, "skipping coincident point");
            continue;
        }
        triangulation
            .insert(NodePoint { position, point })
            .map_err(|_| invalid)?;
    }

    let triangles: Vec<[usize; 3]> = triangulation
        .inner_faces()
        .map(|face| face.vertices().map(|v| v.data().position))
        .collect();

    if triangles.is_empty() {
        return Err(GeometryError::Degenerate(points.len()));
    }

    Ok(triangles)
}

/// Re-triangulate a layout: build the Delaunay graph over `graph`'s nodes.
///
/// `points[i]` must be the position of node `i` of `graph`.
pub fn triangulate(graph: &Graph, points: &[Point]) -> Result<Graph, GeometryError> {
    if points.len() != graph.node_count() {
        return Err(GeometryError::CountMismatch {
            points: points.len(),
            nodes: graph.node_count(),
        });
    }

    let mut triangulated = graph.empty_like();
    for [a, b, c] in triangles(points)? {
        triangulated.add_edge(a, b, EDGE_WEIGHT);
        triangulated.add_edge(a, c, EDGE_WEIGHT);
        triangulated.add_edge(b, c, EDGE_WEIGHT);
    }

    Ok(triangulated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn nodes(n: usize) -> Graph {
        Graph::with_nodes((0..n).map(NodeId::from))
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_triangle_gives_three_edges() {
        let g = nodes(3);
        let s = triangulate(&g, &pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])).unwrap();
        assert_eq!(s.edge_count(), 3);
        assert!(s.has_edge(0, 1));
        assert!(s.has_edge(0, 2));
        assert!(s.has_edge(1, 2));
    }

    #[test]
    fn test_square_gets_exactly_one_diagonal() {
        let g = nodes(4);
        let square = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let s = triangulate(&g, &square).unwrap();

        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            assert!(s.has_edge(a, b), "missing boundary edge {a}-{b}");
        }
        let diagonals = [s.has_edge(0, 2), s.has_edge(1, 3)]
            .iter()
            .filter(|&&d| d)
            .count();
        assert_eq!(diagonals, 1);
        assert_eq!(s.edge_count(), 5);
    }

    #[test]
    fn test_edges_use_constant_weight() {
        let g = nodes(3);
        let s = triangulate(&g, &pts(&[(0.0, 0.0), (10.0, 0.0), (0.0, 3.0)])).unwrap();
        assert!(s.edges().iter().all(|&(_, _, w)| w == EDGE_WEIGHT));
    }

    #[test]
    fn test_keeps_node_set() {
        let g = Graph::with_nodes(["x", "y", "z"].map(NodeId::from));
        let s = triangulate(&g, &pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])).unwrap();
        assert!(g.same_nodes_as(&s));
    }

    #[test]
    fn test_too_few_points() {
        let g = nodes(2);
        let err = triangulate(&g, &pts(&[(0.0, 0.0), (1.0, 1.0)])).unwrap_err();
        assert_eq!(err, GeometryError::TooFewPoints(2));
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let g = nodes(4);
        let line = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(triangulate(&g, &line).unwrap_err(), GeometryError::Degenerate(4));
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let g = nodes(3);
        let same = pts(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert_eq!(triangulate(&g, &same).unwrap_err(), GeometryError::Degenerate(3));
    }

    #[test]
    fn test_duplicate_point_gets_no_edges() {
        let g = nodes(4);
        let coords = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        let s = triangulate(&g, &coords).unwrap();
        assert!(s.neighbors(3).is_empty());
        assert!(s.has_edge(0, 1));
    }

    #[test]
    fn test_count_mismatch() {
        let g = nodes(4);
        let err = triangulate(&g, &pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])).unwrap_err();
        assert_eq!(err, GeometryError::CountMismatch { points: 3, nodes: 4 });
    }

    #[test]
    fn test_non_finite_coordinate() {
        let g = nodes(3);
        let coords = pts(&[(0.0, 0.0), (f64::NAN, 0.0), (0.0, 1.0)]);
        assert!(matches!(
            triangulate(&g, &coords),
            Err(GeometryError::InvalidCoordinate { position: 1, .. })
        ));
    }

    #[test]
    fn test_triangles_of_convex_pentagon() {
        let pentagon: Vec<Point> = (0..5)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / 5.0;
                Point::new(angle.cos(), angle.sin())
            })
            .collect();
        // A convex polygon with n vertices triangulates into n - 2 triangles.
        assert_eq!(triangles(&pentagon).unwrap().len(), 3);
    }
}
