//! Planar geometry: Delaunay re-triangulation of a layout.

mod delaunay;

pub use delaunay::{EDGE_WEIGHT, triangles, triangulate};

use thiserror::Error;

/// Failure to build a triangulation from a coordinate set.
///
/// Any of these aborts a tuning run: a layout that cannot be triangulated
/// cannot be scored.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("need at least 3 points to triangulate, got {0}")]
    TooFewPoints(usize),

    #[error("all {0} points are collinear or coincident; no triangle can be formed")]
    Degenerate(usize),

    #[error("coordinate count {points} does not match node count {nodes}")]
    CountMismatch { points: usize, nodes: usize },

    #[error("point {position} has unusable coordinates ({x}, {y})")]
    InvalidCoordinate { position: usize, x: f64, y: f64 },
}
