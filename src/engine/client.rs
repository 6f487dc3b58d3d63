//! CyREST client - Cytoscape's HTTP automation API.
//!
//! # Endpoints
//!
//! | Operation             | Request                                                      |
//! |-----------------------|--------------------------------------------------------------|
//! | availability          | `GET /`                                                      |
//! | clear                 | `DELETE /networks`                                           |
//! | create network        | `POST /networks?format=cyjs&title=..&collection=..`          |
//! | node handles          | `GET /networks/{net}/tables/defaultnode/rows`                |
//! | view lookup           | `GET /networks/{net}/views` (`POST` to create if missing)    |
//! | style defaults        | `PUT /styles/default/defaults`                               |
//! | layout parameters     | `PUT /apply/layouts/{name}/parameters`                       |
//! | run layout            | `GET /apply/layouts/{name}/{net}`                            |
//! | positions             | `GET /networks/{net}/views/{view}/nodes?visualProperty=..`   |
//!
//! Networks are uploaded as cytoscape.js JSON with each node's `name` set to
//! its graph identifier. Node handles are matched back through that column,
//! which is how positions are returned in graph order no matter how the
//! engine orders its node table.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{LayoutEngine, NetworkHandle};
use crate::graph::Graph;
use crate::layouts::LayoutFamily;
use crate::types::{LayoutProperty, Point, StyleDefaults};

/// CyREST root on a local Cytoscape desktop.
pub const DEFAULT_URL: &str = "http://localhost:1234/v1";

/// Visual style that receives the default node styling.
const STYLE_NAME: &str = "default";

/// Collection new networks are filed under.
const COLLECTION: &str = "layoutfit";

/// Row of the default node table; only the handle and name are read.
#[derive(Debug, Deserialize)]
struct NodeRow {
    #[serde(rename = "SUID")]
    suid: u64,
    #[serde(default)]
    name: Option<Value>,
}

/// One node's visual property values in a view.
#[derive(Debug, Deserialize)]
struct NodeView {
    #[serde(rename = "SUID")]
    suid: u64,
    view: Vec<VisualValue>,
}

#[derive(Debug, Deserialize)]
struct VisualValue {
    #[serde(rename = "visualProperty")]
    visual_property: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct CreatedNetwork {
    #[serde(rename = "networkSUID")]
    network_suid: u64,
}

#[derive(Debug, Deserialize)]
struct CreatedView {
    #[serde(rename = "networkViewSUID")]
    network_view_suid: u64,
}

/// Blocking CyREST client.
pub struct CyRestClient {
    agent: ureq::Agent,
    base_url: String,
}

impl CyRestClient {
    /// Create a client for the CyREST root at `base_url` (e.g. [`DEFAULT_URL`]).
    ///
    /// `timeout` bounds each request; layout runs on large graphs can be slow.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether CyREST answers at all.
    pub fn is_available(&self) -> bool {
        self.agent.get(&self.url("")).call().is_ok()
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Turn a ureq result into an anyhow one, keeping the server's error body.
    fn check(
        &self,
        result: std::result::Result<ureq::Response, ureq::Error>,
        what: &str,
    ) -> Result<ureq::Response> {
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                bail!("{} failed with HTTP {}: {}", what, code, body.trim())
            }
            Err(err) => Err(anyhow::Error::new(err)).with_context(|| {
                format!("{} failed: is Cytoscape running at {}?", what, self.base_url)
            }),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self.agent.get(&self.url(path));
        for (key, value) in query {
            request = request.query(key, value);
        }
        let what = format!("GET {}", path);
        self.check(request.call(), &what)?
            .into_json()
            .with_context(|| format!("Malformed response to {}", what))
    }

    fn get(&self, path: &str) -> Result<()> {
        let what = format!("GET {}", path);
        self.check(self.agent.get(&self.url(path)).call(), &what)?;
        Ok(())
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<()> {
        let what = format!("PUT {}", path);
        self.check(self.agent.put(&self.url(path)).send_json(body), &what)?;
        Ok(())
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<T> {
        let mut request = self.agent.post(&self.url(path));
        for (key, value) in query {
            request = request.query(key, value);
        }
        let what = format!("POST {}", path);
        self.check(request.send_json(body), &what)?
            .into_json()
            .with_context(|| format!("Malformed response to {}", what))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let what = format!("DELETE {}", path);
        self.check(self.agent.delete(&self.url(path)).call(), &what)?;
        Ok(())
    }

    /// First view of a network, creating one if the engine made none.
    fn ensure_view(&self, network: u64) -> Result<u64> {
        let path = format!("networks/{}/views", network);
        let views: Vec<u64> = self.get_json(&path, &[])?;
        if let Some(&view) = views.first() {
            return Ok(view);
        }
        tracing::debug!(network, "network has no view, creating one");
        let created: CreatedView = self.post_json(&path, &[], &json!({}))?;
        Ok(created.network_view_suid)
    }

    fn visual_property(&self, network: &NetworkHandle, property: &str) -> Result<Vec<NodeView>> {
        self.get_json(
            &format!("networks/{}/views/{}/nodes", network.id, network.view),
            &[("visualProperty", property)],
        )
    }
}

impl LayoutEngine for CyRestClient {
    fn clear(&mut self) -> Result<()> {
        self.delete("networks")
    }

    fn create_network(&mut self, graph: &Graph, title: &str) -> Result<NetworkHandle> {
        let created: CreatedNetwork = self.post_json(
            "networks",
            &[("format", "cyjs"), ("title", title), ("collection", COLLECTION)],
            &cytoscape_json(graph, title),
        )?;
        let id = created.network_suid;

        let rows: Vec<NodeRow> =
            self.get_json(&format!("networks/{}/tables/defaultnode/rows", id), &[])?;
        let nodes = match_node_rows(graph, &rows)?;
        let view = self.ensure_view(id)?;

        tracing::info!(network = id, view, nodes = nodes.len(), "created network");
        Ok(NetworkHandle { id, view, nodes })
    }

    fn apply_style(&mut self, style: &StyleDefaults) -> Result<()> {
        let defaults = json!([
            {"visualProperty": "NODE_SHAPE", "value": style.node_shape},
            {"visualProperty": "NODE_SIZE", "value": style.node_size},
            {"visualProperty": "NODE_LABEL_FONT_SIZE", "value": style.font_size},
        ]);
        self.put_json(&format!("styles/{}/defaults", STYLE_NAME), &defaults)
    }

    fn set_layout_properties(
        &mut self,
        family: LayoutFamily,
        properties: &[LayoutProperty],
    ) -> Result<()> {
        let body = serde_json::to_value(properties).context("Failed to encode layout properties")?;
        self.put_json(
            &format!("apply/layouts/{}/parameters", family.engine_name()),
            &body,
        )
    }

    fn apply_layout(&mut self, network: &NetworkHandle, family: LayoutFamily) -> Result<()> {
        self.get(&format!(
            "apply/layouts/{}/{}",
            family.engine_name(),
            network.id
        ))
    }

    fn node_positions(&mut self, network: &NetworkHandle) -> Result<Vec<Point>> {
        let xs = self.visual_property(network, "NODE_X_LOCATION")?;
        let ys = self.visual_property(network, "NODE_Y_LOCATION")?;
        collect_positions(network, &xs, &ys)
    }
}

/// Encode a graph as a cytoscape.js network document.
fn cytoscape_json(graph: &Graph, title: &str) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .map(|id| json!({"data": {"id": id.as_str(), "name": id.as_str()}}))
        .collect();

    let node_name = |position: usize| graph.node_id(position).map(|id| id.as_str()).unwrap_or("");
    let edges: Vec<Value> = graph
        .edges()
        .into_iter()
        .enumerate()
        .map(|(i, (a, b, weight))| {
            json!({"data": {
                "id": format!("e{}", i),
                "source": node_name(a),
                "target": node_name(b),
                "weight": weight,
                "interaction": "interacts with",
            }})
        })
        .collect();

    json!({
        "data": {"name": title},
        "elements": {"nodes": nodes, "edges": edges},
    })
}

/// Engine node handle for every graph node, in graph position order.
fn match_node_rows(graph: &Graph, rows: &[NodeRow]) -> Result<Vec<u64>> {
    let by_name: HashMap<String, u64> = rows
        .iter()
        .filter_map(|row| {
            let name = match row.name.as_ref()? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((name, row.suid))
        })
        .collect();

    graph
        .nodes()
        .map(|id| {
            by_name
                .get(id.as_str())
                .copied()
                .with_context(|| format!("Engine network has no node named '{}'", id))
        })
        .collect()
}

/// Join X and Y visual property listings into graph-ordered points.
fn collect_positions(network: &NetworkHandle, xs: &[NodeView], ys: &[NodeView]) -> Result<Vec<Point>> {
    let lookup = |views: &[NodeView], property: &str| -> Result<HashMap<u64, f64>> {
        let mut values = HashMap::with_capacity(views.len());
        for node in views {
            let Some(entry) = node.view.iter().find(|v| v.visual_property == property) else {
                continue;
            };
            let Some(value) = entry.value.as_f64() else {
                bail!("Node {} has non-numeric {}: {}", node.suid, property, entry.value);
            };
            values.insert(node.suid, value);
        }
        Ok(values)
    };

    let x_by_node = lookup(xs, "NODE_X_LOCATION")?;
    let y_by_node = lookup(ys, "NODE_Y_LOCATION")?;

    network
        .nodes
        .iter()
        .map(|suid| match (x_by_node.get(suid), y_by_node.get(suid)) {
            (Some(&x), Some(&y)) => Ok(Point::new(x, y)),
            _ => bail!("Engine returned no position for node {}", suid),
        })
        .collect()
}
