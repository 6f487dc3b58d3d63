//! Layout engine access.
//!
//! Layout computation is delegated to an external process; layoutfit never
//! moves nodes itself. This module owns every conversation with that
//! process.
//!
//! # Architecture
//!
//! ```text
//! LayoutSession  (create → configure-repeatedly → read)
//!      ↓
//! LayoutEngine trait
//!      ├── CyRestClient   Cytoscape over HTTP (CyREST)
//!      └── MockEngine     in-memory, for tests and dry runs
//! ```
//!
//! The engine holds exactly one mutable "current layout" per network, so a
//! session must finish one configure → layout → read round trip before
//! starting the next.
//!
//! # Error Handling
//!
//! Every engine failure (unreachable, HTTP error, malformed response, missing
//! node) is returned as an error; there is no retry. A tuning run treats any
//! of them as fatal.

mod client;
mod mock;
mod session;

pub use client::{CyRestClient, DEFAULT_URL};
pub use mock::MockEngine;
pub use session::LayoutSession;

use anyhow::Result;

use crate::graph::Graph;
use crate::layouts::LayoutFamily;
use crate::types::{LayoutProperty, Point, StyleDefaults};

/// Engine-side handle for a network created from a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    /// Engine identifier of the network
    pub id: u64,
    /// Engine identifier of the network view holding positions
    pub view: u64,
    /// Engine identifier of each node, in graph position order
    pub nodes: Vec<u64>,
}

/// Operations a layout engine must support.
///
/// Implementations own the transport; [`LayoutSession`] owns the lifecycle.
pub trait LayoutEngine {
    /// Remove every network from the engine.
    fn clear(&mut self) -> Result<()>;

    /// Upload a graph; the handle maps graph positions to engine nodes.
    fn create_network(&mut self, graph: &Graph, title: &str) -> Result<NetworkHandle>;

    /// Set default visual styling.
    fn apply_style(&mut self, style: &StyleDefaults) -> Result<()>;

    /// Configure the parameters a family's next layout run will use.
    fn set_layout_properties(
        &mut self,
        family: LayoutFamily,
        properties: &[LayoutProperty],
    ) -> Result<()>;

    /// Compute a layout for the network with the configured parameters.
    fn apply_layout(&mut self, network: &NetworkHandle, family: LayoutFamily) -> Result<()>;

    /// Current node positions, in graph position order.
    fn node_positions(&mut self, network: &NetworkHandle) -> Result<Vec<Point>>;
}
