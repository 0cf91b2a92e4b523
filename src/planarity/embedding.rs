use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    cache::DenseIndex,
    errors::GraphError,
    graph::{EdgeId, Graph, SimpleView, VertexId},
};

/// Combinatorial embedding: the cyclic order of incident edges around every
/// vertex. A self-loop appears twice in its vertex's rotation.
#[derive(Debug, Clone)]
pub struct PlanarEmbedding {
    index: Arc<DenseIndex>,
    rotation: Vec<Vec<EdgeId>>,
    /// The two rotation slots `(vertex, position)` holding each edge.
    darts: AHashMap<EdgeId, [(usize, usize); 2]>,
}

impl PlanarEmbedding {
    /// Expands the rotation of the simple view (edge positions into
    /// `view.edges`) back to every edge of `graph`. Parallel edges sit next
    /// to their representative; self-loops go at the end of the rotation.
    pub(super) fn assemble(graph: &Graph, view: &SimpleView, simple: Vec<Vec<usize>>) -> Self {
        let index = Arc::clone(&view.index);
        let mut rotation: Vec<Vec<EdgeId>> = simple
            .into_iter()
            .map(|order| order.into_iter().map(|pos| view.edges[pos].id).collect())
            .collect();
        rotation.resize(index.len(), Vec::new());

        for record in graph.edges() {
            let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
            else {
                continue;
            };
            if u == v {
                rotation[u].push(record.id);
                rotation[u].push(record.id);
                continue;
            }
            let Some(representative) = view.edge_between(u, v) else {
                continue;
            };
            if representative.id == record.id {
                continue;
            }
            let (a, b) = (representative.u, representative.v);
            if let Some(pos) = rotation[a].iter().position(|&e| e == representative.id) {
                rotation[a].insert(pos + 1, record.id);
            }
            if let Some(pos) = rotation[b].iter().position(|&e| e == representative.id) {
                rotation[b].insert(pos, record.id);
            }
        }

        let mut darts: AHashMap<EdgeId, [(usize, usize); 2]> = AHashMap::new();
        for (vertex, order) in rotation.iter().enumerate() {
            for (pos, &edge) in order.iter().enumerate() {
                darts
                    .entry(edge)
                    .and_modify(|slots| slots[1] = (vertex, pos))
                    .or_insert([(vertex, pos), (vertex, pos)]);
            }
        }
        Self {
            index,
            rotation,
            darts,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.darts.len()
    }

    pub fn vertices(&self) -> &[VertexId] {
        self.index.vertices()
    }

    /// Edges around `vertex` in rotation order.
    pub fn edges_around(&self, vertex: VertexId) -> Result<&[EdgeId], GraphError> {
        let pos = self
            .index
            .index_of(vertex)
            .ok_or(GraphError::UnknownVertex(vertex))?;
        Ok(&self.rotation[pos])
    }

    fn twin(&self, (vertex, pos): (usize, usize)) -> (usize, usize) {
        let edge = self.rotation[vertex][pos];
        match self.darts.get(&edge) {
            Some(&[first, second]) if first == (vertex, pos) => second,
            Some(&[first, _]) => first,
            None => (vertex, pos),
        }
    }

    /// Boundary walks of every face. Each edge occurs twice over all faces,
    /// possibly twice in the same face.
    pub fn faces(&self) -> Vec<Vec<EdgeId>> {
        let mut seen: Vec<Vec<bool>> = self.rotation.iter().map(|r| vec![false; r.len()]).collect();
        let mut faces = Vec::new();
        for vertex in 0..self.rotation.len() {
            for pos in 0..self.rotation[vertex].len() {
                if seen[vertex][pos] {
                    continue;
                }
                let mut face = Vec::new();
                let mut dart = (vertex, pos);
                while !seen[dart.0][dart.1] {
                    seen[dart.0][dart.1] = true;
                    face.push(self.rotation[dart.0][dart.1]);
                    let (far, far_pos) = self.twin(dart);
                    dart = (far, (far_pos + 1) % self.rotation[far].len());
                }
                faces.push(face);
            }
        }
        faces
    }
}
