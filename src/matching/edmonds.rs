use std::collections::VecDeque;

use crate::{
    errors::GraphError,
    graph::{Graph, Keep, SimpleView},
};

use super::Matching;

const NONE: usize = usize::MAX;

/// Exact maximum cardinality over an adjacency matrix. Blossoms are
/// contracted by relabelling bases with a sweep over all vertices.
pub(super) fn dense(graph: &Graph) -> Result<Matching, GraphError> {
    let view = SimpleView::build(graph, Keep::First);
    let n = view.vertex_count();
    let mut adjacent = vec![false; n * n];
    for edge in &view.edges {
        adjacent[edge.u * n + edge.v] = true;
        adjacent[edge.v * n + edge.u] = true;
    }
    let mut search = DenseSearch {
        n,
        adjacent,
        mate: vec![NONE; n],
        parent: vec![NONE; n],
        base: (0..n).collect(),
        used: vec![false; n],
        blossom: vec![false; n],
        queue: VecDeque::new(),
    };
    for root in 0..n {
        if search.mate[root] == NONE {
            let end = search.find_path(root);
            if end != NONE {
                search.augment(end);
            }
        }
    }
    to_matching(graph, &view, &search.mate)
}

/// Exact maximum cardinality over adjacency lists, seeded with a greedy
/// matching. Blossom bases are tracked with a union-find.
pub(super) fn sparse(graph: &Graph) -> Result<Matching, GraphError> {
    let view = SimpleView::build(graph, Keep::First);
    let n = view.vertex_count();
    let adjacency = view.adjacency();
    let mut mate = vec![NONE; n];
    for edge in &view.edges {
        if mate[edge.u] == NONE && mate[edge.v] == NONE {
            mate[edge.u] = edge.v;
            mate[edge.v] = edge.u;
        }
    }
    let mut search = SparseSearch {
        adjacency: &adjacency,
        mate,
        pre: vec![NONE; n],
        dsu: (0..n).collect(),
        color: vec![Color::Unreached; n],
        stamp: vec![0; n],
        clock: 0,
        queue: VecDeque::new(),
    };
    for root in 0..n {
        if search.mate[root] == NONE {
            search.augment_from(root);
        }
    }
    to_matching(graph, &view, &search.mate)
}

fn to_matching(graph: &Graph, view: &SimpleView, mate: &[usize]) -> Result<Matching, GraphError> {
    let edges = mate
        .iter()
        .enumerate()
        .filter(|&(u, &v)| v != NONE && u < v)
        .filter_map(|(u, &v)| view.edge_between(u, v))
        .map(|e| e.id);
    Matching::from_edges(graph, edges)
}

struct DenseSearch {
    n: usize,
    adjacent: Vec<bool>,
    mate: Vec<usize>,
    parent: Vec<usize>,
    base: Vec<usize>,
    used: Vec<bool>,
    blossom: Vec<bool>,
    queue: VecDeque<usize>,
}

impl DenseSearch {
    fn lca(&self, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.n];
        loop {
            a = self.base[a];
            seen[a] = true;
            if self.mate[a] == NONE {
                break;
            }
            a = self.parent[self.mate[a]];
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            b = self.parent[self.mate[b]];
        }
    }

    fn mark_path(&mut self, mut v: usize, b: usize, mut child: usize) {
        while self.base[v] != b {
            self.blossom[self.base[v]] = true;
            self.blossom[self.base[self.mate[v]]] = true;
            self.parent[v] = child;
            child = self.mate[v];
            v = self.parent[self.mate[v]];
        }
    }

    /// Alternating BFS from `root`; returns the free vertex ending an
    /// augmenting path, or `NONE`.
    fn find_path(&mut self, root: usize) -> usize {
        let n = self.n;
        self.used.fill(false);
        self.parent.fill(NONE);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }
        self.used[root] = true;
        self.queue.clear();
        self.queue.push_back(root);
        while let Some(v) = self.queue.pop_front() {
            for to in 0..n {
                if !self.adjacent[v * n + to] || self.base[v] == self.base[to] || self.mate[v] == to {
                    continue;
                }
                if to == root || (self.mate[to] != NONE && self.parent[self.mate[to]] != NONE) {
                    let current = self.lca(v, to);
                    self.blossom.fill(false);
                    self.mark_path(v, current, to);
                    self.mark_path(to, current, v);
                    for i in 0..n {
                        if self.blossom[self.base[i]] {
                            self.base[i] = current;
                            if !self.used[i] {
                                self.used[i] = true;
                                self.queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[to] == NONE {
                    self.parent[to] = v;
                    if self.mate[to] == NONE {
                        return to;
                    }
                    let next = self.mate[to];
                    self.used[next] = true;
                    self.queue.push_back(next);
                }
            }
        }
        NONE
    }

    fn augment(&mut self, mut v: usize) {
        while v != NONE {
            let pv = self.parent[v];
            let ppv = self.mate[pv];
            self.mate[v] = pv;
            self.mate[pv] = v;
            v = ppv;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unreached,
    Even,
    Odd,
}

struct SparseSearch<'a> {
    adjacency: &'a [Vec<(usize, usize)>],
    mate: Vec<usize>,
    pre: Vec<usize>,
    dsu: Vec<usize>,
    color: Vec<Color>,
    stamp: Vec<usize>,
    clock: usize,
    queue: VecDeque<usize>,
}

impl SparseSearch<'_> {
    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.dsu[root] != root {
            root = self.dsu[root];
        }
        let mut cur = x;
        while self.dsu[cur] != root {
            let next = self.dsu[cur];
            self.dsu[cur] = root;
            cur = next;
        }
        root
    }

    fn lca(&mut self, mut x: usize, mut y: usize) -> usize {
        self.clock += 1;
        loop {
            if x != NONE {
                x = self.find(x);
                if self.stamp[x] == self.clock {
                    return x;
                }
                self.stamp[x] = self.clock;
                x = match self.mate[x] {
                    NONE => NONE,
                    m => self.pre[m],
                };
            }
            std::mem::swap(&mut x, &mut y);
        }
    }

    fn shrink(&mut self, mut x: usize, mut y: usize, base: usize) {
        while self.find(x) != base {
            self.pre[x] = y;
            y = self.mate[x];
            if self.color[y] == Color::Odd {
                self.color[y] = Color::Even;
                self.queue.push_back(y);
            }
            if self.find(x) == x {
                self.dsu[x] = base;
            }
            if self.find(y) == y {
                self.dsu[y] = base;
            }
            x = self.pre[y];
        }
    }

    fn augment_from(&mut self, root: usize) -> bool {
        for (i, parent) in self.dsu.iter_mut().enumerate() {
            *parent = i;
        }
        self.color.fill(Color::Unreached);
        self.pre.fill(NONE);
        self.color[root] = Color::Even;
        self.queue.clear();
        self.queue.push_back(root);
        let adjacency = self.adjacency;
        while let Some(x) = self.queue.pop_front() {
            for &(y, _) in &adjacency[x] {
                if self.find(x) == self.find(y) || self.color[y] == Color::Odd {
                    continue;
                }
                if self.color[y] == Color::Unreached {
                    self.color[y] = Color::Odd;
                    self.pre[y] = x;
                    if self.mate[y] == NONE {
                        let mut u = y;
                        while u != NONE {
                            let p = self.pre[u];
                            let last = self.mate[p];
                            self.mate[u] = p;
                            self.mate[p] = u;
                            u = last;
                        }
                        return true;
                    }
                    let m = self.mate[y];
                    self.color[m] = Color::Even;
                    self.queue.push_back(m);
                } else {
                    let base = self.lca(x, y);
                    self.shrink(x, y, base);
                    self.shrink(y, x, base);
                }
            }
        }
        false
    }
}
