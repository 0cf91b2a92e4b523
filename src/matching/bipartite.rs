use std::collections::VecDeque;

use tracing::debug;

use crate::{
    errors::GraphError,
    graph::{Graph, Keep, SimpleView},
    partition::{two_coloring, validate_partition},
    set::LongSet,
};

use super::Matching;

const NONE: usize = usize::MAX;

/// Hopcroft–Karp over the graph's own two-colouring.
pub(super) fn max_cardinality(graph: &Graph) -> Result<Matching, GraphError> {
    let Some(sides) = two_coloring(graph) else {
        debug!("bipartite matching on a non-bipartite graph");
        return Ok(Matching::infeasible());
    };
    let view = SimpleView::build(graph, Keep::First);
    let (left, right, slot) = split(&sides);
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); left.len()];
    for edge in &view.edges {
        let (l, r) = if sides[edge.u] { (edge.v, edge.u) } else { (edge.u, edge.v) };
        adjacency[slot[l]].push(slot[r]);
    }
    let pairs = hopcroft_karp(&adjacency, right.len());
    let edges = pairs
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r != NONE)
        .filter_map(|(l, &r)| view.edge_between(left[l], right[r]))
        .map(|e| e.id);
    Matching::from_edges(graph, edges)
}

/// Maximum weight bipartite matching via an assignment on the square cost
/// matrix where missing and non-positive edges cost nothing.
pub(super) fn max_weight(graph: &Graph) -> Result<Matching, GraphError> {
    let Some(sides) = two_coloring(graph) else {
        debug!("bipartite matching on a non-bipartite graph");
        return Ok(Matching::infeasible());
    };
    let view = SimpleView::build(graph, Keep::Heaviest);
    let (left, right, slot) = split(&sides);
    let size = left.len().max(right.len());
    let mut cost = vec![vec![0.0; size]; size];
    for edge in &view.edges {
        if edge.weight > 0.0 {
            let (l, r) = if sides[edge.u] { (edge.v, edge.u) } else { (edge.u, edge.v) };
            cost[slot[l]][slot[r]] = -edge.weight;
        }
    }
    let assignment = hungarian(&cost);
    let edges = assignment
        .iter()
        .enumerate()
        .filter(|&(l, &r)| l < left.len() && r < right.len() && cost[l][r] < 0.0)
        .filter_map(|(l, &r)| view.edge_between(left[l], right[r]))
        .map(|e| e.id);
    Matching::from_edges(graph, edges)
}

/// Minimum weight perfect matching between two explicitly given classes.
///
/// A malformed partition is an error; a partition that admits no perfect
/// matching yields an infeasible result.
pub fn bipartite_perfect_min_weight(
    graph: &Graph,
    first: &LongSet,
    second: &LongSet,
) -> Result<Matching, GraphError> {
    let sides = validate_partition(graph, first, second)?;
    let (left, right, slot) = split(&sides);
    if left.len() != right.len() {
        debug!(left = left.len(), right = right.len(), "unbalanced partition");
        return Ok(Matching::infeasible());
    }
    let view = SimpleView::build(graph, Keep::Lightest);
    let size = left.len();
    // any assignment using a missing edge costs more than every perfect one
    let missing = view.edges.iter().map(|e| e.weight.abs()).sum::<f64>() * 2.0 + 1.0;
    let mut cost = vec![vec![missing; size]; size];
    let mut present = vec![vec![false; size]; size];
    for edge in &view.edges {
        let (l, r) = if sides[edge.u] { (edge.v, edge.u) } else { (edge.u, edge.v) };
        cost[slot[l]][slot[r]] = edge.weight;
        present[slot[l]][slot[r]] = true;
    }
    let assignment = hungarian(&cost);
    if assignment.iter().enumerate().any(|(l, &r)| !present[l][r]) {
        return Ok(Matching::infeasible());
    }
    let edges = assignment
        .iter()
        .enumerate()
        .filter_map(|(l, &r)| view.edge_between(left[l], right[r]))
        .map(|e| e.id);
    let matching = Matching::from_edges(graph, edges)?;
    debug!(
        cardinality = matching.cardinality(),
        weight = matching.weight(),
        "bipartite perfect matching computed"
    );
    Ok(matching)
}

/// Dense vertex lists of both sides and each vertex's position within its
/// side.
fn split(sides: &[bool]) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut slot = vec![0; sides.len()];
    for (v, &is_right) in sides.iter().enumerate() {
        if is_right {
            slot[v] = right.len();
            right.push(v);
        } else {
            slot[v] = left.len();
            left.push(v);
        }
    }
    (left, right, slot)
}

/// Returns the right partner of every left vertex, or `NONE`.
fn hopcroft_karp(adjacency: &[Vec<usize>], right_count: usize) -> Vec<usize> {
    let left_count = adjacency.len();
    let mut pair_left = vec![NONE; left_count];
    let mut pair_right = vec![NONE; right_count];
    let mut dist = vec![usize::MAX; left_count];
    let mut next_edge = vec![0usize; left_count];
    let mut queue = VecDeque::new();

    loop {
        // layer the free left vertices
        queue.clear();
        for l in 0..left_count {
            if pair_left[l] == NONE {
                dist[l] = 0;
                queue.push_back(l);
            } else {
                dist[l] = usize::MAX;
            }
        }
        let mut free_layer = usize::MAX;
        while let Some(l) = queue.pop_front() {
            if dist[l] >= free_layer {
                continue;
            }
            for &r in &adjacency[l] {
                match pair_right[r] {
                    NONE => {
                        if free_layer == usize::MAX {
                            free_layer = dist[l] + 1;
                        }
                    }
                    m if dist[m] == usize::MAX => {
                        dist[m] = dist[l] + 1;
                        queue.push_back(m);
                    }
                    _ => {}
                }
            }
        }
        if free_layer == usize::MAX {
            break;
        }

        next_edge.fill(0);
        for root in 0..left_count {
            if pair_left[root] != NONE {
                continue;
            }
            let mut stack = vec![root];
            while let Some(&l) = stack.last() {
                if next_edge[l] >= adjacency[l].len() {
                    dist[l] = usize::MAX;
                    stack.pop();
                    if let Some(&parent) = stack.last() {
                        next_edge[parent] += 1;
                    }
                    continue;
                }
                let r = adjacency[l][next_edge[l]];
                match pair_right[r] {
                    NONE if dist[l] + 1 == free_layer => {
                        for &u in &stack {
                            let v = adjacency[u][next_edge[u]];
                            pair_left[u] = v;
                            pair_right[v] = u;
                        }
                        break;
                    }
                    m if m != NONE && dist[m] != usize::MAX && dist[m] == dist[l] + 1 => {
                        stack.push(m);
                    }
                    _ => next_edge[l] += 1,
                }
            }
        }
    }
    pair_left
}

/// Minimum cost assignment on a square matrix (Kuhn–Munkres with
/// potentials). Returns the column chosen for each row.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    // 1-based rows and columns; row/column 0 is the virtual start
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut row_of = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];
    for i in 1..=n {
        row_of[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = row_of[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let current = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if current < minv[j] {
                    minv[j] = current;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[row_of[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if row_of[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            row_of[j0] = row_of[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }
    let mut assignment = vec![0; n];
    for j in 1..=n {
        if row_of[j] > 0 {
            assignment[row_of[j] - 1] = j - 1;
        }
    }
    assignment
}
