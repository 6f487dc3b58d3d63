//! Node-link JSON loading.
//!
//! Reads the `{"nodes": [...], "links": [...]}` layout written by networkx's
//! `node_link_data`. Only node ids, link endpoints and an optional `weight`
//! are used; all other attributes are ignored.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

use super::Graph;
use crate::types::NodeId;

/// Weight given to links without a `weight` attribute.
const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Deserialize)]
struct NodeLinkData {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    nodes: Vec<NodeEntry>,
    #[serde(default, alias = "edges")]
    links: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    id: Value,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    source: Value,
    target: Value,
    #[serde(default)]
    weight: Option<f64>,
}

/// Load a graph from a node-link JSON file.
pub fn load_node_link(path: &Path) -> Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file {}", path.display()))?;
    parse_node_link(&content).with_context(|| format!("Invalid graph file {}", path.display()))
}

/// Parse node-link JSON text into a [`Graph`].
///
/// Node positions follow the `nodes` array; endpoints that only appear in
/// `links` are appended in first-reference order. Directed and multigraph
/// inputs are read as simple undirected graphs.
pub fn parse_node_link(json: &str) -> Result<Graph> {
    let data: NodeLinkData =
        serde_json::from_str(json).context("Failed to parse node-link JSON")?;

    if data.directed {
        tracing::warn!("directed graph will be treated as undirected");
    }
    if data.multigraph {
        tracing::warn!("multigraph parallel edges will be collapsed");
    }

    let mut graph = Graph::new();
    for (i, node) in data.nodes.iter().enumerate() {
        let Some(id) = NodeId::from_json(&node.id) else {
            bail!("Node {} has unusable id {}", i, node.id);
        };
        graph.add_node(id);
    }

    for (i, link) in data.links.iter().enumerate() {
        let (Some(source), Some(target)) = (
            NodeId::from_json(&link.source),
            NodeId::from_json(&link.target),
        ) else {
            bail!(
                "Link {} has unusable endpoints {} -> {}",
                i,
                link.source,
                link.target
            );
        };
        graph.add_edge_between(source, target, link.weight.unwrap_or(DEFAULT_WEIGHT));
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded node-link graph"
    );

    Ok(graph)
}
