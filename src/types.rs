//! Core value types shared across layoutfit.
//!
//! Graph structure lives in [`crate::graph`]; these are the small plain-data
//! types that flow between the loader, the layout engine and the scorer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node identifier as it appears in the node-link file.
///
/// Numeric ids are kept in their decimal form so `0` and `"0"` name the
/// same node, which is also how Cytoscape sees them (node `name` column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a JSON id (string, integer or float) into a NodeId.
    ///
    /// Returns None for ids that cannot name a node (null, bool, arrays, objects).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s.as_str())),
            Value::Number(n) => Some(Self::new(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<usize> for NodeId {
    fn from(n: usize) -> Self {
        Self::new(n.to_string())
    }
}

/// A 2D node position as reported by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One named layout parameter, in the shape CyREST expects
/// for `PUT /apply/layouts/{name}/parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutProperty {
    pub name: String,
    pub value: Value,
}

impl LayoutProperty {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Default node styling pushed once when a session opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleDefaults {
    /// Cytoscape NODE_SHAPE value
    pub node_shape: String,
    /// Cytoscape NODE_SIZE value
    pub node_size: f64,
    /// Cytoscape NODE_LABEL_FONT_SIZE value
    pub font_size: f64,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            node_shape: "ELLIPSE".to_string(),
            node_size: 15.0,
            font_size: 10.0,
        }
    }
}
