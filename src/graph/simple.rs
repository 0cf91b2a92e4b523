use std::sync::Arc;

use ahash::AHashMap;

use crate::cache::DenseIndex;

use super::{EdgeId, Graph};

/// Which edge represents a bundle of parallel edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keep {
    First,
    Heaviest,
    Lightest,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimpleEdge {
    pub u: usize,
    pub v: usize,
    pub weight: f64,
    pub id: EdgeId,
}

impl SimpleEdge {
    pub fn other(&self, x: usize) -> usize {
        if self.u == x { self.v } else { self.u }
    }
}

/// Underlying simple undirected graph over the dense vertex numbering:
/// self-loops dropped, each parallel bundle reduced to one edge.
#[derive(Debug, Clone)]
pub struct SimpleView {
    pub index: Arc<DenseIndex>,
    pub edges: Vec<SimpleEdge>,
    pairs: AHashMap<(usize, usize), usize>,
}

impl SimpleView {
    pub fn build(graph: &Graph, keep: Keep) -> Self {
        let index = graph.dense_index();
        let mut edges: Vec<SimpleEdge> = Vec::with_capacity(graph.edge_count());
        let mut pairs = AHashMap::with_capacity(graph.edge_count());
        for record in graph.edges() {
            if record.is_self_loop() {
                continue;
            }
            let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
            else {
                continue;
            };
            let weight = if graph.is_weighted() { record.weight } else { 1.0 };
            let key = (u.min(v), u.max(v));
            match pairs.get(&key) {
                Some(&pos) => {
                    let current: &mut SimpleEdge = &mut edges[pos];
                    let replace = match keep {
                        Keep::First => false,
                        Keep::Heaviest => weight > current.weight,
                        Keep::Lightest => weight < current.weight,
                    };
                    if replace {
                        current.weight = weight;
                        current.id = record.id;
                    }
                }
                None => {
                    pairs.insert(key, edges.len());
                    edges.push(SimpleEdge {
                        u,
                        v,
                        weight,
                        id: record.id,
                    });
                }
            }
        }
        Self {
            index,
            edges,
            pairs,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_between(&self, u: usize, v: usize) -> Option<&SimpleEdge> {
        self.pairs
            .get(&(u.min(v), u.max(v)))
            .map(|&pos| &self.edges[pos])
    }

    /// Per-vertex `(neighbor, edge position)` lists in edge order.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); self.vertex_count()];
        for (pos, edge) in self.edges.iter().enumerate() {
            adj[edge.u].push((edge.v, pos));
            adj[edge.v].push((edge.u, pos));
        }
        adj
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.vertex_count()];
        for edge in &self.edges {
            degrees[edge.u] += 1;
            degrees[edge.v] += 1;
        }
        degrees
    }
}
