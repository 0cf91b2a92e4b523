use std::collections::BTreeMap;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::GraphError,
    graph::{Graph, VertexId},
};

/// Vertex-to-score map, iterated in ascending vertex order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexScores {
    values: BTreeMap<VertexId, f64>,
    version: u64,
}

impl VertexScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the previous score of `vertex`, if any.
    pub fn put(&mut self, vertex: VertexId, score: f64) -> Option<f64> {
        self.version += 1;
        self.values.insert(vertex, score)
    }

    pub fn get(&self, vertex: VertexId) -> Option<f64> {
        self.values.get(&vertex).copied()
    }

    pub fn contains_key(&self, vertex: VertexId) -> bool {
        self.values.contains_key(&vertex)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.values.iter().map(|(&v, &s)| (v, s))
    }
}

impl FromIterator<(VertexId, f64)> for VertexScores {
    fn from_iter<I: IntoIterator<Item = (VertexId, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            version: 0,
        }
    }
}

/// PageRank parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of following an edge rather than jumping.
    pub damping: f64,
    pub max_iterations: usize,
    /// Iteration stops once no score moves by more than this.
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 0.0001,
        }
    }
}

impl PageRankConfig {
    fn validate(&self) -> Result<(), GraphError> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(GraphError::illegal_argument(format!(
                "damping factor {} outside [0, 1]",
                self.damping
            )));
        }
        if self.max_iterations == 0 {
            return Err(GraphError::illegal_argument("max_iterations must be positive"));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(GraphError::illegal_argument("tolerance must be positive"));
        }
        Ok(())
    }
}

/// Power-iteration PageRank. Undirected edges count in both directions,
/// edge weights scale the transition probabilities and dangling vertices
/// spread their score uniformly.
pub fn pagerank(graph: &Graph, config: &PageRankConfig) -> Result<VertexScores, GraphError> {
    config.validate()?;
    let index = graph.dense_index();
    let n = index.len();
    if n == 0 {
        return Ok(VertexScores::new());
    }
    // (from, to, weight) transitions
    let mut transitions: Vec<(usize, usize, f64)> = Vec::with_capacity(graph.edge_count() * 2);
    for record in graph.edges() {
        let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
        else {
            continue;
        };
        let w = graph.edge_weight(record.id)?;
        transitions.push((u, v, w));
        if !graph.is_directed() && u != v {
            transitions.push((v, u, w));
        }
    }
    let mut out_weight = vec![0.0; n];
    for &(u, _, w) in &transitions {
        out_weight[u] += w;
    }

    let nf = n as f64;
    let mut scores = vec![1.0 / nf; n];
    let mut next = vec![0.0; n];
    let mut iterations = 0;
    while iterations < config.max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&u| out_weight[u] <= 0.0)
            .map(|u| scores[u])
            .sum();
        let base = (1.0 - config.damping) / nf + config.damping * dangling / nf;
        next.iter_mut().for_each(|s| *s = base);
        for &(u, v, w) in &transitions {
            if out_weight[u] > 0.0 {
                next[v] += config.damping * scores[u] * w / out_weight[u];
            }
        }
        let delta = scores
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        std::mem::swap(&mut scores, &mut next);
        iterations += 1;
        if delta < config.tolerance {
            break;
        }
    }
    debug!(vertices = n, iterations, "pagerank converged");
    Ok(index
        .vertices()
        .iter()
        .zip(scores)
        .map(|(&v, s)| (v, s))
        .collect())
}

/// k-core decomposition. Returns the graph degeneracy and each vertex's
/// core number. Self-loops are ignored; parallel edges count once each.
pub fn coreness(graph: &Graph) -> Result<(usize, VertexScores), GraphError> {
    let index = graph.dense_index();
    let n = index.len();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for record in graph.edges() {
        if record.is_self_loop() {
            continue;
        }
        let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
        else {
            continue;
        };
        adj[u].push(v);
        adj[v].push(u);
    }

    // Batagelj–Zaversnik bucket ordering
    let mut degree: Vec<usize> = adj.iter().map(Vec::len).collect();
    let max_degree = degree.iter().copied().max().unwrap_or(0);
    let mut bin = vec![0usize; max_degree + 1];
    for &d in &degree {
        bin[d] += 1;
    }
    let mut start = 0;
    for slot in bin.iter_mut() {
        let count = *slot;
        *slot = start;
        start += count;
    }
    let mut pos = vec![0usize; n];
    let mut order = vec![0usize; n];
    for v in 0..n {
        pos[v] = bin[degree[v]];
        order[pos[v]] = v;
        bin[degree[v]] += 1;
    }
    for d in (1..=max_degree).rev() {
        bin[d] = bin[d - 1];
    }
    if let Some(first) = bin.first_mut() {
        *first = 0;
    }
    for i in 0..n {
        let v = order[i];
        for &u in &adj[v] {
            if degree[u] > degree[v] {
                let du = degree[u];
                let pu = pos[u];
                let pw = bin[du];
                let w = order[pw];
                if u != w {
                    pos[u] = pw;
                    order[pu] = w;
                    pos[w] = pu;
                    order[pw] = u;
                }
                bin[du] += 1;
                degree[u] -= 1;
            }
        }
    }

    let degeneracy = degree.iter().copied().max().unwrap_or(0);
    debug!(vertices = n, degeneracy, "coreness computed");
    let scores = index
        .vertices()
        .iter()
        .zip(&degree)
        .map(|(&v, &core)| (v, core as f64))
        .collect();
    Ok((degeneracy, scores))
}

/// Clustering statistics of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Transitivity: closed triplets over all connected triplets.
    pub global: f64,
    /// Mean of the local coefficients over all vertices.
    pub average: f64,
    pub local: VertexScores,
}

/// Local coefficients use the directed neighbourhood definition
/// `links / (k * (k - 1))` on directed graphs and `2 * links / (k * (k - 1))`
/// otherwise. Self-loops and parallel edges are ignored.
pub fn clustering_coefficient(graph: &Graph) -> Result<Clustering, GraphError> {
    let index = graph.dense_index();
    let n = index.len();
    let mut neighbors: Vec<AHashSet<usize>> = vec![AHashSet::new(); n];
    let mut successors: Vec<AHashSet<usize>> = vec![AHashSet::new(); n];
    for record in graph.edges() {
        if record.is_self_loop() {
            continue;
        }
        let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
        else {
            continue;
        };
        neighbors[u].insert(v);
        neighbors[v].insert(u);
        successors[u].insert(v);
        if !graph.is_directed() {
            successors[v].insert(u);
        }
    }

    let mut local = VertexScores::new();
    let mut local_sum = 0.0;
    let mut closed = 0usize;
    let mut triplets = 0usize;
    for v in 0..n {
        let hood: Vec<usize> = neighbors[v].iter().copied().collect();
        let k = hood.len();
        let mut undirected_links = 0usize;
        let mut directed_links = 0usize;
        for (i, &a) in hood.iter().enumerate() {
            for &b in &hood[i + 1..] {
                if neighbors[a].contains(&b) {
                    undirected_links += 1;
                }
                directed_links += usize::from(successors[a].contains(&b))
                    + usize::from(successors[b].contains(&a));
            }
        }
        let coefficient = if k < 2 {
            0.0
        } else if graph.is_directed() {
            directed_links as f64 / (k * (k - 1)) as f64
        } else {
            2.0 * undirected_links as f64 / (k * (k - 1)) as f64
        };
        local_sum += coefficient;
        local.put(index.vertex(v), coefficient);
        closed += undirected_links;
        triplets += k * k.saturating_sub(1) / 2;
    }

    let global = if triplets == 0 {
        0.0
    } else {
        closed as f64 / triplets as f64
    };
    let average = if n == 0 { 0.0 } else { local_sum / n as f64 };
    debug!(vertices = n, global, average, "clustering computed");
    Ok(Clustering {
        global,
        average,
        local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    #[test]
    fn triangle_with_pendant() {
        let mut graph = Graph::new(GraphConfig::undirected());
        let v: Vec<_> = (0..4)
            .map(|_| graph.add_vertex(None).expect("vertex"))
            .collect();
        for (a, b) in [(0, 1), (1, 2), (2, 0), (2, 3)] {
            graph.add_edge(v[a], v[b], None).expect("edge");
        }
        let (degeneracy, cores) = coreness(&graph).expect("coreness");
        assert_eq!(degeneracy, 2);
        assert_eq!(cores.get(v[3]), Some(1.0));
        assert_eq!(cores.get(v[0]), Some(2.0));

        let clustering = clustering_coefficient(&graph).expect("clustering");
        assert_eq!(clustering.local.get(v[0]), Some(1.0));
        assert!((clustering.local.get(v[2]).expect("score") - 1.0 / 3.0).abs() < 1e-12);
        assert!((clustering.global - 3.0 / 5.0).abs() < 1e-12);
    }
}
