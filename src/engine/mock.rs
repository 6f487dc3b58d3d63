//! In-memory layout engine.

use std::collections::HashMap;
use std::f64::consts::TAU;

use anyhow::{Result, bail};

use super::{LayoutEngine, NetworkHandle};
use crate::graph::Graph;
use crate::layouts::LayoutFamily;
use crate::types::{LayoutProperty, Point, StyleDefaults};

type LayoutFn = Box<dyn FnMut(&[LayoutProperty], usize) -> Result<Vec<Point>>>;

/// Engine that computes layouts with a closure and records every call.
///
/// The closure receives the properties configured for the family being
/// applied and the node count, and returns positions in graph order.
pub struct MockEngine {
    layout_fn: LayoutFn,
    properties: HashMap<LayoutFamily, Vec<LayoutProperty>>,
    /// Node count per created network; handle id is index + 1
    networks: Vec<usize>,
    current: HashMap<u64, Vec<Point>>,
    style: Option<StyleDefaults>,
    calls: Vec<String>,
}

impl MockEngine {
    /// Circle layout perturbed by the numeric property values.
    pub fn new() -> Self {
        Self::from_fn(|properties, n| Ok(perturbed_circle(properties, n)))
    }

    /// Always return the same positions.
    pub fn with_positions(points: Vec<Point>) -> Self {
        Self::from_fn(move |_, _| Ok(points.clone()))
    }

    pub fn from_fn<F>(layout_fn: F) -> Self
    where
        F: FnMut(&[LayoutProperty], usize) -> Result<Vec<Point>> + 'static,
    {
        Self {
            layout_fn: Box::new(layout_fn),
            properties: HashMap::new(),
            networks: Vec::new(),
            current: HashMap::new(),
            style: None,
            calls: Vec::new(),
        }
    }

    /// Engine operations in call order, e.g. `"apply_layout kamada-kawai 1"`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Properties last configured for `family`.
    pub fn properties(&self, family: LayoutFamily) -> Option<&[LayoutProperty]> {
        self.properties.get(&family).map(Vec::as_slice)
    }

    pub fn style(&self) -> Option<&StyleDefaults> {
        self.style.as_ref()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    fn node_count(&self, network: &NetworkHandle) -> Result<usize> {
        match network.id.checked_sub(1).and_then(|i| self.networks.get(i as usize)) {
            Some(&n) => Ok(n),
            None => bail!("Unknown network {}", network.id),
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for MockEngine {
    fn clear(&mut self) -> Result<()> {
        self.calls.push("clear".to_string());
        self.networks.clear();
        self.current.clear();
        Ok(())
    }

    fn create_network(&mut self, graph: &Graph, title: &str) -> Result<NetworkHandle> {
        self.calls.push(format!("create_network {}", title));
        self.networks.push(graph.node_count());
        let id = self.networks.len() as u64;
        Ok(NetworkHandle {
            id,
            view: id,
            nodes: (0..graph.node_count() as u64).collect(),
        })
    }

    fn apply_style(&mut self, style: &StyleDefaults) -> Result<()> {
        self.calls.push("apply_style".to_string());
        self.style = Some(style.clone());
        Ok(())
    }

    fn set_layout_properties(
        &mut self,
        family: LayoutFamily,
        properties: &[LayoutProperty],
    ) -> Result<()> {
        self.calls.push(format!("set_layout_properties {}", family));
        self.properties.insert(family, properties.to_vec());
        Ok(())
    }

    fn apply_layout(&mut self, network: &NetworkHandle, family: LayoutFamily) -> Result<()> {
        self.calls.push(format!("apply_layout {} {}", family, network.id));
        let n = self.node_count(network)?;
        let properties = self.properties.get(&family).cloned().unwrap_or_default();
        let points = (self.layout_fn)(&properties, n)?;
        self.current.insert(network.id, points);
        Ok(())
    }

    fn node_positions(&mut self, network: &NetworkHandle) -> Result<Vec<Point>> {
        self.calls.push(format!("node_positions {}", network.id));
        match self.current.get(&network.id) {
            Some(points) => Ok(points.clone()),
            None => bail!("No layout has been applied to network {}", network.id),
        }
    }
}

/// Nodes on a circle, pulled inward or outward by the property values.
fn perturbed_circle(properties: &[LayoutProperty], n: usize) -> Vec<Point> {
    let knob: f64 = properties
        .iter()
        .filter_map(|p| p.value.as_f64())
        .map(|v| v.abs().ln_1p())
        .sum();

    (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n.max(1) as f64;
            let radius = 100.0 + 10.0 * (knob * (i as f64 + 1.0)).sin();
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
