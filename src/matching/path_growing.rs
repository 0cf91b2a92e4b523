use crate::{
    errors::GraphError,
    graph::{Graph, Keep, SimpleView},
};

use super::Matching;

/// Drake–Hougardy path growing: repeatedly extends a path along the heaviest
/// edge to an unvisited vertex, alternately assigning path edges to two
/// matchings and keeping the heavier one. With `use_heuristics` each grown
/// path is instead matched optimally by dynamic programming, which never
/// does worse. Only positive-weight edges are considered.
pub(super) fn max_weight(graph: &Graph, use_heuristics: bool) -> Result<Matching, GraphError> {
    let view = SimpleView::build(graph, Keep::Heaviest);
    let n = view.vertex_count();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (pos, edge) in view.edges.iter().enumerate() {
        if edge.weight > 0.0 {
            adjacency[edge.u].push(pos);
            adjacency[edge.v].push(pos);
        }
    }

    let mut removed = vec![false; n];
    let mut alternating: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    let mut alternating_weight = [0.0_f64; 2];
    let mut optimal_paths: Vec<usize> = Vec::new();

    for start in 0..n {
        if removed[start] {
            continue;
        }
        let mut path: Vec<usize> = Vec::new();
        let mut current = start;
        loop {
            let heaviest = adjacency[current]
                .iter()
                .copied()
                .filter(|&pos| !removed[view.edges[pos].other(current)])
                .fold(None::<usize>, |best, pos| match best {
                    Some(b) if view.edges[b].weight >= view.edges[pos].weight => Some(b),
                    _ => Some(pos),
                });
            removed[current] = true;
            let Some(pos) = heaviest else {
                break;
            };
            let side = path.len() % 2;
            alternating[side].push(pos);
            alternating_weight[side] += view.edges[pos].weight;
            path.push(pos);
            current = view.edges[pos].other(current);
        }
        if use_heuristics {
            optimal_paths.extend(best_on_path(&view, &path));
        }
    }

    let chosen = if use_heuristics {
        optimal_paths
    } else if alternating_weight[0] >= alternating_weight[1] {
        std::mem::take(&mut alternating[0])
    } else {
        std::mem::take(&mut alternating[1])
    };
    Matching::from_edges(graph, chosen.into_iter().map(|pos| view.edges[pos].id))
}

/// Maximum weight matching of a path given as its consecutive edges.
fn best_on_path(view: &SimpleView, path: &[usize]) -> Vec<usize> {
    let k = path.len();
    // best[i]: optimum over the first i edges
    let mut best = vec![0.0_f64; k + 1];
    for i in 1..=k {
        let with = view.edges[path[i - 1]].weight + if i >= 2 { best[i - 2] } else { 0.0 };
        best[i] = best[i - 1].max(with);
    }
    let mut chosen = Vec::new();
    let mut i = k;
    while i > 0 {
        if best[i] == best[i - 1] {
            i -= 1;
        } else {
            chosen.push(path[i - 1]);
            i = i.saturating_sub(2);
        }
    }
    chosen
}
