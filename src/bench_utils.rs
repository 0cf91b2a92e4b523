//! Seeded graph generators shared by benchmarks and randomised tests.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::GraphConfig,
    errors::GraphError,
    graph::{Graph, VertexId},
};

#[derive(Clone, Debug)]
pub struct GraphDataset {
    pub vertex_count: usize,
    /// `(source, target, weight)` with endpoints in `0..vertex_count`.
    pub edges: Vec<(usize, usize, f64)>,
}

impl GraphDataset {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.vertex_count];
        for &(from, to, _) in &self.edges {
            counts[from] += 1;
            counts[to] += 1;
        }
        counts
    }

    /// Replaces every weight with an integer drawn uniformly from
    /// `1..=max_weight`.
    pub fn with_random_weights(mut self, max_weight: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for edge in &mut self.edges {
            edge.2 = f64::from(rng.gen_range(1..=max_weight.max(1)));
        }
        self
    }

    /// Builds a [`Graph`]; position `i` becomes the `i`-th added vertex.
    pub fn materialize(&self, config: GraphConfig) -> Result<(Graph, Vec<VertexId>), GraphError> {
        let weighted = config.weighted;
        let mut graph = Graph::new(config);
        let mut ids = Vec::with_capacity(self.vertex_count);
        for _ in 0..self.vertex_count {
            ids.push(graph.add_vertex(None)?);
        }
        for &(from, to, weight) in &self.edges {
            let edge = graph.add_edge(ids[from], ids[to], None)?;
            if weighted {
                graph.set_edge_weight(edge, weight)?;
            }
        }
        Ok((graph, ids))
    }
}

#[derive(Clone, Debug)]
pub enum GraphShape {
    Line,
    Star,
    Grid2D { width: usize, height: usize },
    RandomErdosRenyi { edges: usize },
    ScaleFree { m: usize },
    /// Random stacked triangulation, maximal planar for three or more vertices.
    Apollonian,
}

pub fn generate_graph(shape: GraphShape, vertex_count: usize, seed: u64) -> GraphDataset {
    assert!(vertex_count > 1, "vertex_count must exceed 1");
    let mut edges = match shape {
        GraphShape::Line => (0..vertex_count - 1).map(|v| (v, v + 1)).collect(),
        GraphShape::Star => (1..vertex_count).map(|leaf| (0, leaf)).collect(),
        GraphShape::Grid2D { width, height } => grid_edges(width, height, vertex_count),
        GraphShape::RandomErdosRenyi { edges } => random_edges(vertex_count, edges, seed),
        GraphShape::ScaleFree { m } => scale_free_edges(vertex_count, m, seed),
        GraphShape::Apollonian => apollonian_edges(vertex_count, seed),
    };
    edges.sort_unstable();
    GraphDataset {
        vertex_count,
        edges: edges.into_iter().map(|(a, b)| (a, b, 1.0)).collect(),
    }
}

fn grid_edges(width: usize, height: usize, vertex_count: usize) -> Vec<(usize, usize)> {
    assert_eq!(
        width * height,
        vertex_count,
        "grid dimensions must match vertex count"
    );
    let mut edges = Vec::with_capacity(width * height * 2);
    for y in 0..height {
        for x in 0..width {
            let base = y * width + x;
            if x + 1 < width {
                edges.push((base, base + 1));
            }
            if y + 1 < height {
                edges.push((base, base + width));
            }
        }
    }
    edges
}

/// Uniform sample of `edge_count` distinct pairs, skipping ahead by
/// geometric gaps over the pair enumeration.
fn random_edges(vertex_count: usize, edge_count: usize, seed: u64) -> Vec<(usize, usize)> {
    let total_pairs = pair_count(vertex_count);
    assert!(
        edge_count as u128 <= total_pairs,
        "edge_count exceeds possible pairs"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(edge_count);
    let mut idx = 0u64;
    let mut remaining_edges = edge_count as u64;
    while remaining_edges > 0 && idx < total_pairs as u64 {
        let remaining_pairs = total_pairs as u64 - idx;
        let p = remaining_edges as f64 / remaining_pairs as f64;
        idx += sample_geometric(&mut rng, p);
        if idx >= total_pairs as u64 {
            break;
        }
        let (from, to) = pair_from_index(idx, vertex_count as u64);
        edges.push((from as usize, to as usize));
        idx += 1;
        remaining_edges -= 1;
    }
    edges
}

fn scale_free_edges(vertex_count: usize, m: usize, seed: u64) -> Vec<(usize, usize)> {
    assert!(m > 0, "m must be positive");
    assert!(vertex_count > m + 1, "vertex_count must exceed m + 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut degrees = vec![0usize; vertex_count];
    let mut edges = Vec::new();
    let seed_vertices = m + 1;
    for u in 0..seed_vertices {
        for v in (u + 1)..seed_vertices {
            edges.push((u, v));
            degrees[u] += 1;
            degrees[v] += 1;
        }
    }
    let mut total_degree: usize = degrees.iter().sum();
    for new_vertex in seed_vertices..vertex_count {
        let mut targets = Vec::with_capacity(m);
        while targets.len() < m {
            let pick = rng.gen_range(0..total_degree);
            let mut cumulative = 0usize;
            for candidate in 0..new_vertex {
                cumulative += degrees[candidate];
                if pick < cumulative {
                    if !targets.contains(&candidate) {
                        targets.push(candidate);
                    }
                    break;
                }
            }
        }
        targets.sort_unstable();
        for target in targets {
            edges.push((target, new_vertex));
            degrees[target] += 1;
            degrees[new_vertex] += 1;
            total_degree += 2;
        }
    }
    edges
}

/// Every new vertex goes into a uniformly picked inner face and is joined to
/// its three corners.
fn apollonian_edges(vertex_count: usize, seed: u64) -> Vec<(usize, usize)> {
    if vertex_count < 3 {
        return vec![(0, 1)];
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = vec![(0, 1), (1, 2), (0, 2)];
    let mut faces = vec![[0, 1, 2]];
    for v in 3..vertex_count {
        let [a, b, c] = faces.swap_remove(rng.gen_range(0..faces.len()));
        edges.extend([(a, v), (b, v), (c, v)]);
        faces.extend([[a, b, v], [b, c, v], [a, c, v]]);
    }
    edges
}

fn pair_count(vertices: usize) -> u128 {
    let n = vertices as u128;
    n * (n - 1) / 2
}

fn sample_geometric(rng: &mut StdRng, p: f64) -> u64 {
    let u = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    ((u.ln() / (1.0 - p).ln()).floor().max(0.0)) as u64
}

fn pair_from_index(idx: u64, vertices: u64) -> (u64, u64) {
    let mut left = 0;
    let mut start = 0u64;
    while left < vertices - 1 {
        let remaining = vertices - left - 1;
        if idx < start + remaining {
            return (left, left + 1 + (idx - start));
        }
        start += remaining;
        left += 1;
    }
    (vertices - 2, vertices - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_graph_is_simple_and_sized() {
        let dataset = generate_graph(GraphShape::RandomErdosRenyi { edges: 40 }, 20, 7);
        assert!(dataset.edge_count() <= 40);
        let mut pairs: Vec<_> = dataset.edges.iter().map(|&(a, b, _)| (a, b)).collect();
        pairs.dedup();
        assert_eq!(pairs.len(), dataset.edge_count());
        assert!(pairs.iter().all(|&(a, b)| a < b && b < 20));
    }

    #[test]
    fn apollonian_graph_is_maximal_planar() {
        let dataset = generate_graph(GraphShape::Apollonian, 30, 3);
        assert_eq!(dataset.edge_count(), 3 * 30 - 6);
        assert!(dataset.degrees().iter().all(|&d| d >= 3));
    }
}
