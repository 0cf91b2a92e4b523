use std::sync::Arc;

use ahash::AHashMap;
use tracing::trace;

use crate::{
    cache::{DenseIndex, DenseIndexCache},
    config::GraphConfig,
    errors::GraphError,
};

use super::types::{EdgeDirection, EdgeId, EdgeRecord, ExternalId, VertexId, VertexSlot};

pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Mutable vertex/edge store.
///
/// Removal tombstones the slot: indices of the remaining vertices and edges
/// never change and removed indices are never handed out again.
pub struct Graph {
    config: GraphConfig,
    vertices: Vec<Option<VertexSlot>>,
    edges: Vec<Option<EdgeRecord>>,
    vertex_count: usize,
    edge_count: usize,
    vertex_ids: AHashMap<ExternalId, VertexId>,
    edge_ids: AHashMap<ExternalId, EdgeId>,
    version: u64,
    dense: DenseIndexCache,
}

impl Graph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_count: 0,
            edge_count: 0,
            vertex_ids: AHashMap::new(),
            edge_ids: AHashMap::new(),
            version: 0,
            dense: DenseIndexCache::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn is_directed(&self) -> bool {
        self.config.directed
    }

    pub fn is_weighted(&self) -> bool {
        self.config.weighted
    }

    /// Monotonic stamp bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn add_vertex(&mut self, external_id: Option<ExternalId>) -> Result<VertexId, GraphError> {
        if let Some(ext) = external_id.as_ref() {
            if self.vertex_ids.contains_key(ext) {
                return Err(GraphError::illegal_argument(format!(
                    "vertex external id {ext} already in use"
                )));
            }
        }
        let id = self.vertices.len() as VertexId;
        if let Some(ext) = external_id.clone() {
            self.vertex_ids.insert(ext, id);
        }
        self.vertices.push(Some(VertexSlot {
            external_id,
            ..VertexSlot::default()
        }));
        self.vertex_count += 1;
        self.touch();
        trace!(vertex = id, "vertex added");
        Ok(id)
    }

    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        external_id: Option<ExternalId>,
    ) -> Result<EdgeId, GraphError> {
        self.slot(source)?;
        self.slot(target)?;
        if source == target && !self.config.allow_self_loops {
            return Err(GraphError::illegal_argument(format!(
                "self-loop on vertex {source} not allowed"
            )));
        }
        if !self.config.allow_multiple_edges && self.edge_between(source, target)?.is_some() {
            return Err(GraphError::illegal_argument(format!(
                "edge {source}-{target} already exists"
            )));
        }
        if let Some(ext) = external_id.as_ref() {
            if self.edge_ids.contains_key(ext) {
                return Err(GraphError::illegal_argument(format!(
                    "edge external id {ext} already in use"
                )));
            }
        }
        let id = self.edges.len() as EdgeId;
        if let Some(ext) = external_id.clone() {
            self.edge_ids.insert(ext, id);
        }
        self.edges.push(Some(EdgeRecord {
            id,
            source,
            target,
            weight: DEFAULT_EDGE_WEIGHT,
            external_id,
        }));
        self.slot_mut(source)?.outgoing.push(id);
        self.slot_mut(target)?.incoming.push(id);
        self.edge_count += 1;
        self.touch();
        trace!(edge = id, source, target, "edge added");
        Ok(id)
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        let record = self.edge(edge)?.clone();
        let outgoing = &mut self.slot_mut(record.source)?.outgoing;
        if let Some(pos) = outgoing.iter().position(|&e| e == edge) {
            outgoing.remove(pos);
        }
        let incoming = &mut self.slot_mut(record.target)?.incoming;
        if let Some(pos) = incoming.iter().position(|&e| e == edge) {
            incoming.remove(pos);
        }
        if let Some(ext) = record.external_id.as_ref() {
            self.edge_ids.remove(ext);
        }
        self.edges[edge as usize] = None;
        self.edge_count -= 1;
        self.touch();
        Ok(())
    }

    /// Removes `vertex` together with every incident edge.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        let incident = self.incident_edges(vertex, EdgeDirection::Incident)?;
        for edge in incident {
            self.remove_edge(edge)?;
        }
        let slot = self.vertices[vertex as usize].take();
        if let Some(ext) = slot.and_then(|s| s.external_id) {
            self.vertex_ids.remove(&ext);
        }
        self.vertex_count -= 1;
        self.touch();
        Ok(())
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.slot(vertex).is_ok()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge(edge).is_ok()
    }

    pub fn edge(&self, edge: EdgeId) -> Result<&EdgeRecord, GraphError> {
        usize::try_from(edge)
            .ok()
            .and_then(|idx| self.edges.get(idx))
            .and_then(Option::as_ref)
            .ok_or(GraphError::UnknownEdge(edge))
    }

    pub fn edge_endpoints(&self, edge: EdgeId) -> Result<(VertexId, VertexId), GraphError> {
        let record = self.edge(edge)?;
        Ok((record.source, record.target))
    }

    pub fn edge_weight(&self, edge: EdgeId) -> Result<f64, GraphError> {
        let record = self.edge(edge)?;
        if self.config.weighted {
            Ok(record.weight)
        } else {
            Ok(DEFAULT_EDGE_WEIGHT)
        }
    }

    pub fn set_edge_weight(&mut self, edge: EdgeId, weight: f64) -> Result<(), GraphError> {
        if !self.config.weighted {
            return Err(GraphError::unsupported("graph is not weighted"));
        }
        if !weight.is_finite() {
            return Err(GraphError::illegal_argument(format!(
                "edge weight must be finite, got {weight}"
            )));
        }
        self.edge(edge)?;
        if let Some(Some(record)) = self.edges.get_mut(edge as usize) {
            record.weight = weight;
        }
        self.touch();
        Ok(())
    }

    pub fn degree(&self, vertex: VertexId) -> Result<usize, GraphError> {
        let slot = self.slot(vertex)?;
        Ok(slot.outgoing.len() + slot.incoming.len())
    }

    pub fn in_degree(&self, vertex: VertexId) -> Result<usize, GraphError> {
        if !self.config.directed {
            return self.degree(vertex);
        }
        Ok(self.slot(vertex)?.incoming.len())
    }

    pub fn out_degree(&self, vertex: VertexId) -> Result<usize, GraphError> {
        if !self.config.directed {
            return self.degree(vertex);
        }
        Ok(self.slot(vertex)?.outgoing.len())
    }

    pub fn opposite(&self, edge: EdgeId, vertex: VertexId) -> Result<VertexId, GraphError> {
        self.edge(edge)?.opposite(vertex).ok_or_else(|| {
            GraphError::illegal_argument(format!("vertex {vertex} is not an endpoint of edge {edge}"))
        })
    }

    /// First edge joining `u` and `v`, respecting direction on directed graphs.
    pub fn edge_between(&self, u: VertexId, v: VertexId) -> Result<Option<EdgeId>, GraphError> {
        let su = self.slot(u)?;
        self.slot(v)?;
        let found = su.outgoing.iter().copied().find(|&e| {
            self.edges[e as usize]
                .as_ref()
                .is_some_and(|r| r.target == v)
        });
        if found.is_some() || self.config.directed {
            return Ok(found);
        }
        Ok(su.incoming.iter().copied().find(|&e| {
            self.edges[e as usize]
                .as_ref()
                .is_some_and(|r| r.source == v)
        }))
    }

    pub fn vertex_by_external_id(&self, id: &ExternalId) -> Option<VertexId> {
        self.vertex_ids.get(id).copied()
    }

    pub fn edge_by_external_id(&self, id: &ExternalId) -> Option<EdgeId> {
        self.edge_ids.get(id).copied()
    }

    pub fn external_id_of_vertex(&self, vertex: VertexId) -> Result<Option<&ExternalId>, GraphError> {
        Ok(self.slot(vertex)?.external_id.as_ref())
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(idx, _)| idx as VertexId)
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.edges.iter().filter_map(Option::as_ref)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges().map(|e| e.id)
    }

    pub fn incident_edges(
        &self,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Result<Vec<EdgeId>, GraphError> {
        let mut result = Vec::new();
        let mut pos = 0;
        while let Some((edge, next)) = self.incident_edge_at(vertex, direction, pos)? {
            result.push(edge);
            pos = next;
        }
        Ok(result)
    }

    /// Cursor step over `vertex`'s edges: the first edge at or after `pos`
    /// and the position to resume from.
    pub fn incident_edge_at(
        &self,
        vertex: VertexId,
        direction: EdgeDirection,
        pos: usize,
    ) -> Result<Option<(EdgeId, usize)>, GraphError> {
        let slot = self.slot(vertex)?;
        let none: &[EdgeId] = &[];
        let (first, second) = match direction {
            EdgeDirection::Outgoing if self.config.directed => (slot.outgoing.as_slice(), none),
            EdgeDirection::Incoming if self.config.directed => (slot.incoming.as_slice(), none),
            _ => (slot.outgoing.as_slice(), slot.incoming.as_slice()),
        };
        if pos < first.len() {
            return Ok(Some((first[pos], pos + 1)));
        }
        let mut idx = pos - first.len();
        while idx < second.len() {
            let edge = second[idx];
            // loops already appear in `first`
            let is_loop = self.edges[edge as usize]
                .as_ref()
                .is_some_and(EdgeRecord::is_self_loop);
            if !is_loop {
                return Ok(Some((edge, first.len() + idx + 1)));
            }
            idx += 1;
        }
        Ok(None)
    }

    /// First live vertex with index ≥ `pos`.
    pub fn vertex_at_or_after(&self, pos: usize) -> Option<VertexId> {
        self.vertices
            .iter()
            .enumerate()
            .skip(pos)
            .find(|(_, slot)| slot.is_some())
            .map(|(idx, _)| idx as VertexId)
    }

    /// First live edge with index ≥ `pos`.
    pub fn edge_at_or_after(&self, pos: usize) -> Option<EdgeId> {
        self.edges
            .iter()
            .skip(pos)
            .find_map(|slot| slot.as_ref().map(|r| r.id))
    }

    /// Live vertices renumbered 0..n in ascending id order; cached until the
    /// next mutation.
    pub fn dense_index(&self) -> Arc<DenseIndex> {
        if let Some(cached) = self.dense.get() {
            return cached;
        }
        let index = Arc::new(DenseIndex::new(self.vertices().collect()));
        self.dense.insert(index.clone());
        index
    }

    fn slot(&self, vertex: VertexId) -> Result<&VertexSlot, GraphError> {
        usize::try_from(vertex)
            .ok()
            .and_then(|idx| self.vertices.get(idx))
            .and_then(Option::as_ref)
            .ok_or(GraphError::UnknownVertex(vertex))
    }

    fn slot_mut(&mut self, vertex: VertexId) -> Result<&mut VertexSlot, GraphError> {
        usize::try_from(vertex)
            .ok()
            .and_then(|idx| self.vertices.get_mut(idx))
            .and_then(Option::as_mut)
            .ok_or(GraphError::UnknownVertex(vertex))
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dense.clear();
    }
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            vertex_count: self.vertex_count,
            edge_count: self.edge_count,
            vertex_ids: self.vertex_ids.clone(),
            edge_ids: self.edge_ids.clone(),
            version: self.version,
            dense: DenseIndexCache::new(),
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("config", &self.config)
            .field("vertices", &self.vertex_count)
            .field("edges", &self.edge_count)
            .field("version", &self.version)
            .finish()
    }
}
