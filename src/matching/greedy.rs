use crate::{
    errors::GraphError,
    graph::{Graph, Keep, SimpleEdge, SimpleView},
};

use super::{EdgeOrder, Matching};

/// Scans edges once and keeps every edge whose endpoints are both free.
pub(super) fn max_cardinality(graph: &Graph, order: EdgeOrder) -> Result<Matching, GraphError> {
    let keep = match order {
        EdgeOrder::DescendingWeight => Keep::Heaviest,
        _ => Keep::First,
    };
    let view = SimpleView::build(graph, keep);
    let mut edges: Vec<&SimpleEdge> = view.edges.iter().collect();
    match order {
        EdgeOrder::Insertion => {}
        EdgeOrder::DegreeSum => {
            let degrees = view.degrees();
            edges.sort_by_key(|e| degrees[e.u] + degrees[e.v]);
        }
        EdgeOrder::DescendingWeight => {
            edges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        }
    }
    Matching::from_edges(graph, take_free(view.vertex_count(), edges))
}

/// Heaviest-first greedy; a 1/2-approximation of the maximum weight.
///
/// With `normalize` an edge is ranked by its weight over the sum of its
/// endpoint degrees. Ranks within `epsilon` of each other are ties and keep
/// edge-index order; ranks not above `epsilon` are never taken.
pub(super) fn max_weight(graph: &Graph, normalize: bool, epsilon: f64) -> Result<Matching, GraphError> {
    let view = SimpleView::build(graph, Keep::Heaviest);
    let degrees = view.degrees();
    let mut ranked: Vec<(f64, &SimpleEdge)> = view
        .edges
        .iter()
        .map(|e| {
            let rank = if normalize {
                e.weight / (degrees[e.u] + degrees[e.v]) as f64
            } else {
                e.weight
            };
            (rank, e)
        })
        .filter(|(rank, _)| *rank > epsilon)
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    if epsilon > 0.0 {
        let mut start = 0;
        while start < ranked.len() {
            let head = ranked[start].0;
            let mut end = start + 1;
            while end < ranked.len() && head - ranked[end].0 <= epsilon {
                end += 1;
            }
            ranked[start..end].sort_by_key(|(_, e)| e.id);
            start = end;
        }
    }

    Matching::from_edges(graph, take_free(view.vertex_count(), ranked.into_iter().map(|(_, e)| e)))
}

pub(super) fn take_free<'a, I>(n: usize, edges: I) -> Vec<i64>
where
    I: IntoIterator<Item = &'a SimpleEdge>,
{
    let mut matched = vec![false; n];
    let mut taken = Vec::new();
    for edge in edges {
        if !matched[edge.u] && !matched[edge.v] {
            matched[edge.u] = true;
            matched[edge.v] = true;
            taken.push(edge.id);
        }
    }
    taken
}
