use std::collections::VecDeque;

use tracing::debug;

use crate::{
    errors::GraphError,
    graph::{Graph, VertexId},
    set::LongSet,
};

/// Result of a bipartiteness check. When the graph is not bipartite both
/// parts are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Bipartition {
    pub is_bipartite: bool,
    pub first: LongSet,
    pub second: LongSet,
}

/// Two-colours the underlying undirected graph by BFS. Every component's
/// lowest vertex lands in the first part; a self-loop or odd cycle makes the
/// graph non-bipartite.
pub fn bipartite_partition(graph: &Graph) -> Bipartition {
    match two_coloring(graph) {
        Some(sides) => {
            let index = graph.dense_index();
            let mut first = LongSet::linked();
            let mut second = LongSet::linked();
            for (i, &right) in sides.iter().enumerate() {
                if right {
                    second.add(index.vertex(i));
                } else {
                    first.add(index.vertex(i));
                }
            }
            Bipartition {
                is_bipartite: true,
                first,
                second,
            }
        }
        None => Bipartition {
            is_bipartite: false,
            first: LongSet::linked(),
            second: LongSet::linked(),
        },
    }
}

/// Side of every vertex in dense order (`true` for the second part), or
/// `None` when the graph is not bipartite.
pub(crate) fn two_coloring(graph: &Graph) -> Option<Vec<bool>> {
    let index = graph.dense_index();
    let n = index.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for record in graph.edges() {
        let (u, v) = (index.index_of(record.source)?, index.index_of(record.target)?);
        if u == v {
            debug!(vertex = record.source, "self-loop rules out a bipartition");
            return None;
        }
        adjacency[u].push(v);
        adjacency[v].push(u);
    }
    let mut side: Vec<Option<bool>> = vec![None; n];
    let mut queue = VecDeque::new();
    for root in 0..n {
        if side[root].is_some() {
            continue;
        }
        side[root] = Some(false);
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            let here = side[u]?;
            for &v in &adjacency[u] {
                match side[v] {
                    None => {
                        side[v] = Some(!here);
                        queue.push_back(v);
                    }
                    Some(there) if there == here => return None,
                    Some(_) => {}
                }
            }
        }
    }
    side.into_iter().collect()
}

/// Checks that `first` and `second` split the live vertices of `graph`
/// into two independent sets and returns the side of every vertex in dense
/// order.
pub fn validate_partition(
    graph: &Graph,
    first: &LongSet,
    second: &LongSet,
) -> Result<Vec<bool>, GraphError> {
    let index = graph.dense_index();
    let mut side: Vec<Option<bool>> = vec![None; index.len()];
    for (set, is_second) in [(first, false), (second, true)] {
        for vertex in set.iter() {
            let pos = index.index_of(vertex as VertexId).ok_or_else(|| {
                GraphError::illegal_argument(format!("partition names unknown vertex {vertex}"))
            })?;
            if side[pos].is_some() {
                return Err(GraphError::illegal_argument(format!(
                    "vertex {vertex} appears in both partition classes"
                )));
            }
            side[pos] = Some(is_second);
        }
    }
    let sides = side
        .iter()
        .enumerate()
        .map(|(pos, s)| {
            s.ok_or_else(|| {
                GraphError::illegal_argument(format!(
                    "vertex {} is missing from the partition",
                    index.vertex(pos)
                ))
            })
        })
        .collect::<Result<Vec<bool>, GraphError>>()?;
    for record in graph.edges() {
        let (Some(u), Some(v)) = (index.index_of(record.source), index.index_of(record.target))
        else {
            continue;
        };
        if sides[u] == sides[v] {
            return Err(GraphError::illegal_argument(format!(
                "edge {} joins two vertices of the same partition class",
                record.id
            )));
        }
    }
    Ok(sides)
}
