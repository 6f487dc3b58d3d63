//! Explicit engine session: one network, many layout runs.

use anyhow::{Context, Result, bail};

use super::{LayoutEngine, NetworkHandle};
use crate::graph::Graph;
use crate::layouts::LayoutFamily;
use crate::types::{LayoutProperty, Point, StyleDefaults};

/// A graph loaded into an engine, ready for repeated layout runs.
///
/// Opening a session clears the engine, so at most one session should be
/// alive per engine. The session borrows the engine mutably for its whole
/// lifetime, which keeps configure → layout → read rounds from interleaving.
pub struct LayoutSession<'e, E: LayoutEngine> {
    engine: &'e mut E,
    network: NetworkHandle,
    node_count: usize,
}

impl<'e, E: LayoutEngine> LayoutSession<'e, E> {
    /// Clear the engine, upload `graph` under `title`, and apply `style`.
    pub fn open(
        engine: &'e mut E,
        graph: &Graph,
        title: &str,
        style: &StyleDefaults,
    ) -> Result<Self> {
        engine.clear().context("Failed to clear layout engine")?;
        let network = engine
            .create_network(graph, title)
            .context("Failed to create network in layout engine")?;
        if network.nodes.len() != graph.node_count() {
            bail!(
                "Engine network has {} nodes, graph has {}",
                network.nodes.len(),
                graph.node_count()
            );
        }
        engine
            .apply_style(style)
            .context("Failed to apply default style")?;

        Ok(Self {
            engine,
            network,
            node_count: graph.node_count(),
        })
    }

    pub fn network(&self) -> &NetworkHandle {
        &self.network
    }

    /// Configure `family`, run it, and return positions in graph order.
    pub fn run_layout(
        &mut self,
        family: LayoutFamily,
        properties: &[LayoutProperty],
    ) -> Result<Vec<Point>> {
        self.engine
            .set_layout_properties(family, properties)
            .with_context(|| format!("Failed to set {} properties", family))?;
        self.engine
            .apply_layout(&self.network, family)
            .with_context(|| format!("Failed to apply {} layout", family))?;
        let points = self
            .engine
            .node_positions(&self.network)
            .context("Failed to read node positions")?;

        if points.len() != self.node_count {
            bail!(
                "Engine returned {} positions for {} nodes",
                points.len(),
                self.node_count
            );
        }
        Ok(points)
    }
}
