//! Creation-time configuration for graphs and sets.
//!
//! Every flag here is fixed for the lifetime of the object it configures;
//! there is no way to flip a graph from undirected to directed after
//! [`crate::graph::Graph::new`].

use serde::{Deserialize, Serialize};

use crate::errors::GraphError;

/// Structural policy of a graph.
///
/// # Default Behavior
///
/// The default is an undirected, unweighted graph that rejects self-loops
/// and parallel edges, i.e. a simple graph.
///
/// # Examples
///
/// ```rust
/// use nativegraph::GraphConfig;
///
/// let simple = GraphConfig::default();
/// assert!(!simple.directed);
///
/// let weighted = GraphConfig::undirected().weighted(true);
/// assert!(weighted.weighted);
///
/// let parsed = GraphConfig::from_json(r#"{"directed": true}"#).unwrap();
/// assert!(parsed.directed);
/// assert!(!parsed.allow_self_loops);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Edges have a source and a target; degree splits into in/out.
    pub directed: bool,

    /// Edge weights may be changed with `set_edge_weight`.
    ///
    /// **Default:** `false`
    ///
    /// Unweighted graphs report a weight of 1.0 for every edge.
    pub weighted: bool,

    /// Edges whose source equals their target are accepted.
    pub allow_self_loops: bool,

    /// More than one edge may join the same pair of vertices.
    pub allow_multiple_edges: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            directed: false,
            weighted: false,
            allow_self_loops: false,
            allow_multiple_edges: false,
        }
    }
}

impl GraphConfig {
    pub fn new(
        directed: bool,
        weighted: bool,
        allow_self_loops: bool,
        allow_multiple_edges: bool,
    ) -> Self {
        Self {
            directed,
            weighted,
            allow_self_loops,
            allow_multiple_edges,
        }
    }

    pub fn undirected() -> Self {
        Self::default()
    }

    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    /// Undirected pseudograph: weighted, loops and parallel edges allowed.
    pub fn pseudograph() -> Self {
        Self {
            directed: false,
            weighted: true,
            allow_self_loops: true,
            allow_multiple_edges: true,
        }
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    pub fn allow_self_loops(mut self, allow: bool) -> Self {
        self.allow_self_loops = allow;
        self
    }

    pub fn allow_multiple_edges(mut self, allow: bool) -> Self {
        self.allow_multiple_edges = allow;
        self
    }

    /// Parses a configuration document; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        serde_json::from_str(input).map_err(|e| GraphError::illegal_argument(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(self).map_err(|e| GraphError::illegal_argument(e.to_string()))
    }
}

/// Backing representation of a [`crate::set::LongSet`].
///
/// The choice only changes iteration order and complexity, never membership
/// semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    /// Hash table; iteration order is unspecified.
    Hash,
    /// Ordered tree; iteration is ascending.
    Sorted,
    /// Hash table plus insertion order; iteration follows insertion.
    #[default]
    Linked,
}
