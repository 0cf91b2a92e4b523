use std::fmt;

use serde::{Deserialize, Serialize};

pub type VertexId = i64;
pub type EdgeId = i64;

/// Caller-supplied identity attached to a vertex or edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExternalId {
    Int(i64),
    Text(String),
}

impl From<i64> for ExternalId {
    fn from(value: i64) -> Self {
        ExternalId::Int(value)
    }
}

impl From<&str> for ExternalId {
    fn from(value: &str) -> Self {
        ExternalId::Text(value.to_string())
    }
}

impl From<String> for ExternalId {
    fn from(value: String) -> Self {
        ExternalId::Text(value)
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Int(v) => write!(f, "{v}"),
            ExternalId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,
    pub weight: f64,
    pub external_id: Option<ExternalId>,
}

impl EdgeRecord {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The endpoint that is not `vertex`; `None` if `vertex` is not an endpoint.
    pub fn opposite(&self, vertex: VertexId) -> Option<VertexId> {
        if self.source == vertex {
            Some(self.target)
        } else if self.target == vertex {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn joins(&self, u: VertexId, v: VertexId) -> bool {
        (self.source == u && self.target == v) || (self.source == v && self.target == u)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDirection {
    /// Every edge touching the vertex; a self-loop is listed once.
    Incident,
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexSlot {
    pub(crate) outgoing: Vec<EdgeId>,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) external_id: Option<ExternalId>,
}
