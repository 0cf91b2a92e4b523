use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::graph::VertexId;

/// Compact renumbering of the live vertices of a graph, in ascending id order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseIndex {
    vertices: Vec<VertexId>,
    positions: AHashMap<VertexId, usize>,
}

impl DenseIndex {
    pub fn new(vertices: Vec<VertexId>) -> Self {
        let positions = vertices
            .iter()
            .enumerate()
            .map(|(idx, &v)| (v, idx))
            .collect();
        Self {
            vertices,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn index_of(&self, vertex: VertexId) -> Option<usize> {
        self.positions.get(&vertex).copied()
    }

    pub fn vertex(&self, index: usize) -> VertexId {
        self.vertices[index]
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }
}

#[derive(Default)]
pub struct DenseIndexCache {
    inner: RwLock<Option<Arc<DenseIndex>>>,
}

impl DenseIndexCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<Arc<DenseIndex>> {
        self.inner.read().clone()
    }

    pub fn insert(&self, value: Arc<DenseIndex>) {
        *self.inner.write() = Some(value);
    }

    pub fn clear(&self) {
        self.inner.write().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_get_insert_clear() {
        let cache = DenseIndexCache::new();
        assert!(cache.get().is_none());
        cache.insert(Arc::new(DenseIndex::new(vec![0, 2, 5])));
        let index = cache.get().expect("cached");
        assert_eq!(index.index_of(5), Some(2));
        assert_eq!(index.index_of(1), None);
        cache.clear();
        assert!(cache.get().is_none());
    }
}
