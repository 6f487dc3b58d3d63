//! layoutfit - Tune graph layouts to preserve graph structure
//!
//! Searches the parameter space of a force-directed (or stress-majorization)
//! layout algorithm for the setting whose node placement, re-triangulated,
//! best recovers the input graph's edges. Layouts are computed by Cytoscape
//! over its CyREST API; layoutfit only scores them.
//!
//! # Architecture
//!
//! ```text
//! Node-link JSON → Layout Session → Engine Layout → Delaunay → Jaccard → Study
//!       ↓               ↓               ↓              ↓          ↓         ↓
//!    serde         CyREST/ureq      positions       spade     per-node   guided
//!   petgraph       (or mock)       graph order     triangles   overlap   search
//! ```
//!
//! # Score
//!
//! For each node, the Jaccard index between its neighbours in the input graph
//! and its neighbours in the Delaunay triangulation of the layout; the score
//! is the mean over all nodes, in [0, 1]. Higher means nodes adjacent in the
//! graph are also spatially adjacent.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod graph;
pub mod layouts;
pub mod scoring;
pub mod training;
pub mod tuner;
pub mod types;

// Re-export core types
pub use types::{LayoutProperty, NodeId, Point, StyleDefaults};

pub use config::Config;
pub use engine::{CyRestClient, LayoutEngine, LayoutSession, MockEngine, NetworkHandle};
pub use geometry::{GeometryError, triangulate};
pub use graph::{Graph, load_node_link};
pub use layouts::LayoutFamily;
pub use scoring::{jaccard_similarity, layout_score};
pub use training::{SearchStrategy, Study, TrialLog};
pub use tuner::Tuner;
