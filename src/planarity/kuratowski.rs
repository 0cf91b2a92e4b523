use std::{collections::BTreeSet, fmt};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::SetKind,
    errors::GraphError,
    graph::{EdgeId, Graph, SimpleView},
    set::LongSet,
};

use super::boyer_myrvold;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KuratowskiKind {
    K5,
    K33,
}

impl fmt::Display for KuratowskiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuratowskiKind::K5 => f.write_str("K5"),
            KuratowskiKind::K33 => f.write_str("K3,3"),
        }
    }
}

/// Edge-minimal non-planar subgraph certifying a failed planarity test.
#[derive(Debug, Clone, PartialEq)]
pub struct KuratowskiSubdivision {
    edges: LongSet,
    kind: KuratowskiKind,
}

impl KuratowskiSubdivision {
    pub fn edges(&self) -> &LongSet {
        &self.edges
    }

    pub fn kind(&self) -> KuratowskiKind {
        self.kind
    }
}

/// Shrinks the non-planar simple view to an edge-minimal non-planar
/// subgraph, which is a subdivision of K5 or K3,3.
///
/// Pendant edges go first. The rest is grouped into chains through
/// degree-two vertices: dropping one edge of a chain leaves the others
/// pendant, so a chain is kept or dropped as a whole. Chains are dropped in
/// halving blocks, ending with single chains until a pass changes nothing.
pub(super) fn extract(view: &SimpleView) -> Result<KuratowskiSubdivision, GraphError> {
    let mut shrink = Shrinker::new(view);
    let all: Vec<usize> = (0..view.edges.len()).collect();
    let mut kept = shrink.strip_pendants(&all);
    let mut block = usize::MAX;
    loop {
        let chains = shrink.chains(&kept);
        block = (block / 2).clamp(1, (chains.len() / 2).max(1));
        let (survivors, dropped) = shrink.pass(&chains, block);
        kept = shrink.strip_pendants(&survivors);
        if block == 1 && !dropped {
            break;
        }
    }

    let labelled: Vec<(i64, i64)> = kept
        .iter()
        .map(|&pos| (view.edges[pos].u as i64, view.edges[pos].v as i64))
        .collect();
    let kind = classify(&labelled).ok_or_else(|| {
        GraphError::internal(format!(
            "{} edges left after shrinking are not a K5 or K3,3 subdivision",
            kept.len()
        ))
    })?;
    debug!(
        edges = kept.len(),
        tests = shrink.tests,
        %kind,
        "kuratowski subdivision extracted"
    );
    Ok(KuratowskiSubdivision {
        edges: LongSet::from_values(SetKind::Linked, kept.iter().map(|&pos| view.edges[pos].id)),
        kind,
    })
}

const UNLABELLED: usize = usize::MAX;

/// Edge positions of the view being shrunk, plus scratch labels that
/// compact a candidate subgraph before each planarity test.
struct Shrinker<'a> {
    view: &'a SimpleView,
    label: Vec<usize>,
    touched: Vec<usize>,
    tests: usize,
}

impl<'a> Shrinker<'a> {
    fn new(view: &'a SimpleView) -> Self {
        Self {
            view,
            label: vec![UNLABELLED; view.vertex_count()],
            touched: Vec::new(),
            tests: 0,
        }
    }

    fn endpoints(&self, pos: usize) -> (usize, usize) {
        let edge = &self.view.edges[pos];
        (edge.u, edge.v)
    }

    fn compact(&mut self, x: usize) -> usize {
        if self.label[x] == UNLABELLED {
            self.label[x] = self.touched.len();
            self.touched.push(x);
        }
        self.label[x]
    }

    fn is_non_planar(&mut self, positions: impl IntoIterator<Item = usize>) -> bool {
        let mut pairs = Vec::new();
        for pos in positions {
            let (u, v) = self.endpoints(pos);
            pairs.push((self.compact(u), self.compact(v)));
        }
        let n = self.touched.len();
        for &x in &self.touched {
            self.label[x] = UNLABELLED;
        }
        self.touched.clear();
        self.tests += 1;
        !boyer_myrvold::is_planar(n, &pairs)
    }

    /// Tries to drop each block of `block` consecutive chains; returns the
    /// surviving edges and whether anything was dropped.
    fn pass(&mut self, chains: &[Vec<usize>], block: usize) -> (Vec<usize>, bool) {
        let mut alive = vec![true; chains.len()];
        let mut dropped = false;
        let mut start = 0;
        while start < chains.len() {
            let end = (start + block).min(chains.len());
            let candidate = chains
                .iter()
                .enumerate()
                .filter(|&(i, _)| alive[i] && !(start..end).contains(&i))
                .flat_map(|(_, chain)| chain.iter().copied());
            if self.is_non_planar(candidate) {
                alive[start..end].fill(false);
                dropped = true;
            }
            start = end;
        }
        let survivors = chains
            .iter()
            .zip(&alive)
            .filter(|&(_, &keep)| keep)
            .flat_map(|(chain, _)| chain.iter().copied())
            .collect();
        (survivors, dropped)
    }

    fn incidence(&self, kept: &[usize]) -> AHashMap<usize, Vec<usize>> {
        let mut incident: AHashMap<usize, Vec<usize>> = AHashMap::new();
        for &pos in kept {
            let (u, v) = self.endpoints(pos);
            incident.entry(u).or_default().push(pos);
            incident.entry(v).or_default().push(pos);
        }
        incident
    }

    /// Removes edges until no vertex has degree one. Planarity is unchanged.
    fn strip_pendants(&self, kept: &[usize]) -> Vec<usize> {
        let incident = self.incidence(kept);
        let mut degree: AHashMap<usize, usize> = incident
            .iter()
            .map(|(&x, list)| (x, list.len()))
            .collect();
        let mut queue: Vec<usize> = degree
            .iter()
            .filter(|&(_, &d)| d == 1)
            .map(|(&x, _)| x)
            .collect();
        let mut removed: AHashSet<usize> = AHashSet::new();
        while let Some(x) = queue.pop() {
            let Some(&pos) = incident
                .get(&x)
                .and_then(|list| list.iter().find(|pos| !removed.contains(*pos)))
            else {
                continue;
            };
            removed.insert(pos);
            let (u, v) = self.endpoints(pos);
            for end in [u, v] {
                if let Some(d) = degree.get_mut(&end) {
                    *d -= 1;
                    if *d == 1 {
                        queue.push(end);
                    }
                }
            }
        }
        kept.iter()
            .copied()
            .filter(|pos| !removed.contains(pos))
            .collect()
    }

    /// Groups edges into maximal paths (or cycles) whose inner vertices
    /// have degree two.
    fn chains(&self, kept: &[usize]) -> Vec<Vec<usize>> {
        let incident = self.incidence(kept);
        let mut used: AHashSet<usize> = AHashSet::with_capacity(kept.len());
        let mut chains = Vec::new();
        for &pos in kept {
            if !used.insert(pos) {
                continue;
            }
            let mut chain = vec![pos];
            let (u, v) = self.endpoints(pos);
            for end in [u, v] {
                let (mut at, mut via) = (end, pos);
                while let Some(&[a, b]) = incident.get(&at).map(Vec::as_slice) {
                    let next = if a == via { b } else { a };
                    if !used.insert(next) {
                        break;
                    }
                    chain.push(next);
                    at = self.view.edges[next].other(at);
                    via = next;
                }
            }
            chains.push(chain);
        }
        chains
    }
}

/// Decides whether `edges` of `graph` form a subdivision of K5 or K3,3.
pub fn classify_subdivision(
    graph: &Graph,
    edges: &LongSet,
) -> Result<Option<KuratowskiKind>, GraphError> {
    let pairs = edges
        .iter()
        .map(|edge| graph.edge_endpoints(edge as EdgeId))
        .collect::<Result<Vec<_>, GraphError>>()?;
    Ok(classify(&pairs))
}

/// Suppresses degree-two vertices and checks the branch graph.
fn classify(edges: &[(i64, i64)]) -> Option<KuratowskiKind> {
    if edges.iter().any(|&(a, b)| a == b) {
        return None;
    }
    let mut incident: AHashMap<i64, Vec<usize>> = AHashMap::new();
    for (k, &(a, b)) in edges.iter().enumerate() {
        incident.entry(a).or_default().push(k);
        incident.entry(b).or_default().push(k);
    }
    let branches: Vec<i64> = incident
        .iter()
        .filter(|(_, list)| list.len() != 2)
        .map(|(&v, _)| v)
        .collect();
    let branch_degree = incident.get(branches.first()?)?.len();
    let expected = match (branches.len(), branch_degree) {
        (5, 4) => KuratowskiKind::K5,
        (6, 3) => KuratowskiKind::K33,
        _ => return None,
    };
    if branches
        .iter()
        .any(|b| incident.get(b).map_or(0, Vec::len) != branch_degree)
    {
        return None;
    }

    let other = |k: usize, x: i64| {
        let (a, b) = edges[k];
        if a == x { b } else { a }
    };
    let mut used = vec![false; edges.len()];
    let mut links: BTreeSet<(i64, i64)> = BTreeSet::new();
    let mut path_count = 0;
    for &start in &branches {
        for &first in incident.get(&start)? {
            if used[first] {
                continue;
            }
            used[first] = true;
            let (mut edge, mut at) = (first, other(first, start));
            while incident.get(&at)?.len() == 2 {
                let next = incident
                    .get(&at)?
                    .iter()
                    .copied()
                    .find(|&k| k != edge)?;
                used[next] = true;
                at = other(next, at);
                edge = next;
            }
            if at == start {
                return None;
            }
            path_count += 1;
            links.insert((start.min(at), start.max(at)));
        }
    }
    if used.iter().any(|&u| !u) {
        // a cycle of degree-two vertices hanging off nothing
        return None;
    }

    match expected {
        KuratowskiKind::K5 if path_count == 10 && links.len() == 10 => Some(expected),
        KuratowskiKind::K33 if path_count == 9 && links.len() == 9 => {
            // nine distinct links among six vertices of degree three form
            // K3,3 exactly when they are bipartite
            let mut side: AHashMap<i64, bool> = AHashMap::new();
            let mut stack = vec![branches[0]];
            side.insert(branches[0], false);
            while let Some(x) = stack.pop() {
                let here = side.get(&x).copied()?;
                for &(a, b) in &links {
                    let y = if a == x {
                        b
                    } else if b == x {
                        a
                    } else {
                        continue;
                    };
                    match side.get(&y) {
                        Some(&there) if there == here => return None,
                        Some(_) => {}
                        None => {
                            side.insert(y, !here);
                            stack.push(y);
                        }
                    }
                }
            }
            (side.len() == 6).then_some(expected)
        }
        _ => None,
    }
}
