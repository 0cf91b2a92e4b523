//! Boyer–Myrvold edge-addition planarity test.
//!
//! Works on a simple undirected graph with vertices `0..n` and edges given
//! by index. Vertices are renumbered by DFS discovery order; node `n + c`
//! is the virtual root standing for `parent(c)` in the bicomponent that
//! contains the tree edge to `c`. Every node keeps its incident arcs in a
//! doubly linked list whose two ends are the arcs on the external face, and
//! `ext` links that follow the external face while skipping vertices known
//! to be inactive.

use std::collections::VecDeque;

const NONE: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
struct HalfEdge {
    target: usize,
    twin: usize,
    prev: usize,
    next: usize,
    edge: usize,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    first: usize,
    last: usize,
    ext: [usize; 2],
}

impl Default for Node {
    fn default() -> Self {
        Self {
            first: NONE,
            last: NONE,
            ext: [NONE, NONE],
        }
    }
}

/// Rotation system (edge indices in cyclic order around every vertex) of a
/// planar embedding, or `None` when the graph is not planar.
pub(super) fn embed(n: usize, edges: &[(usize, usize)]) -> Option<Vec<Vec<usize>>> {
    if exceeds_edge_bound(n, edges.len()) {
        return None;
    }
    let mut state = EdgeAddition::new(n, edges);
    if !state.run() {
        return None;
    }
    Some(state.rotations())
}

pub(super) fn is_planar(n: usize, edges: &[(usize, usize)]) -> bool {
    if exceeds_edge_bound(n, edges.len()) {
        return false;
    }
    EdgeAddition::new(n, edges).run()
}

fn exceeds_edge_bound(n: usize, m: usize) -> bool {
    n >= 3 && m > 3 * n - 6
}

struct EdgeAddition {
    n: usize,
    /// DFS index to input vertex.
    vertex_of: Vec<usize>,
    parent: Vec<usize>,
    children: Vec<Vec<usize>>,
    least_ancestor: Vec<usize>,
    lowpoint: Vec<usize>,
    /// Back edges from each vertex down to its descendants.
    forward: Vec<Vec<(usize, usize)>>,
    /// DFS children whose bicomponent is still separate, by lowpoint.
    sep_head: Vec<usize>,
    sep_next: Vec<usize>,
    sep_prev: Vec<usize>,
    nodes: Vec<Node>,
    arcs: Vec<HalfEdge>,
    visited: Vec<usize>,
    backedge_flag: Vec<usize>,
    pertinent_edge: Vec<usize>,
    pertinent_roots: Vec<VecDeque<usize>>,
    /// Bicomponent below tree edge to `c` was flipped relative to its parent.
    inverted: Vec<bool>,
}

impl EdgeAddition {
    fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        for (k, &(a, b)) in edges.iter().enumerate() {
            adjacency[a].push((b, k));
            adjacency[b].push((a, k));
        }

        let mut dfi = vec![NONE; n];
        let mut vertex_of = Vec::with_capacity(n);
        let mut parent = vec![NONE; n];
        let mut parent_edge = vec![NONE; n];
        let mut least_ancestor = vec![n; n];
        let mut forward: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for start in 0..n {
            if dfi[start] != NONE {
                continue;
            }
            dfi[start] = vertex_of.len();
            vertex_of.push(start);
            stack.push((start, 0));
            while let Some(top) = stack.last_mut() {
                let (u, pos) = *top;
                if pos == adjacency[u].len() {
                    stack.pop();
                    continue;
                }
                top.1 += 1;
                let (w, k) = adjacency[u][pos];
                let du = dfi[u];
                if dfi[w] == NONE {
                    let dw = vertex_of.len();
                    dfi[w] = dw;
                    vertex_of.push(w);
                    parent[dw] = du;
                    parent_edge[dw] = k;
                    stack.push((w, 0));
                } else if dfi[w] < du && k != parent_edge[du] {
                    forward[dfi[w]].push((du, k));
                    least_ancestor[du] = least_ancestor[du].min(dfi[w]);
                }
            }
        }

        let mut lowpoint: Vec<usize> = (0..n).map(|v| v.min(least_ancestor[v])).collect();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for v in (0..n).rev() {
            let p = parent[v];
            if p != NONE {
                lowpoint[p] = lowpoint[p].min(lowpoint[v]);
            }
        }
        for v in 0..n {
            if parent[v] != NONE {
                children[parent[v]].push(v);
            }
        }

        // bucket the children by lowpoint so each parent's list is sorted
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); n];
        for v in 0..n {
            if parent[v] != NONE {
                buckets[lowpoint[v]].push(v);
            }
        }
        let mut sep_head = vec![NONE; n];
        let mut sep_tail = vec![NONE; n];
        let mut sep_next = vec![NONE; n];
        let mut sep_prev = vec![NONE; n];
        for bucket in &buckets {
            for &c in bucket {
                let p = parent[c];
                if sep_head[p] == NONE {
                    sep_head[p] = c;
                } else {
                    sep_next[sep_tail[p]] = c;
                    sep_prev[c] = sep_tail[p];
                }
                sep_tail[p] = c;
            }
        }

        let mut state = Self {
            n,
            vertex_of,
            parent,
            children,
            least_ancestor,
            lowpoint,
            forward,
            sep_head,
            sep_next,
            sep_prev,
            nodes: vec![Node::default(); 2 * n],
            arcs: Vec::with_capacity(2 * edges.len()),
            visited: vec![NONE; 2 * n],
            backedge_flag: vec![NONE; n],
            pertinent_edge: vec![NONE; n],
            pertinent_roots: vec![VecDeque::new(); n],
            inverted: vec![false; n],
        };
        // every tree edge starts as its own bicomponent
        for c in 0..n {
            if state.parent[c] != NONE {
                let root = n + c;
                let (a, _) = state.new_arc_pair(root, c, parent_edge[c]);
                let b = state.arcs[a].twin;
                state.attach(root, a, 1);
                state.attach(c, b, 1);
                state.nodes[root].ext = [c, c];
                state.nodes[c].ext = [root, root];
            }
        }
        state
    }

    /// Creates an arc `from -> to` and its twin; returns both indices.
    fn new_arc_pair(&mut self, from: usize, to: usize, edge: usize) -> (usize, usize) {
        let a = self.arcs.len();
        let b = a + 1;
        self.arcs.push(HalfEdge {
            target: to,
            twin: b,
            prev: NONE,
            next: NONE,
            edge,
        });
        self.arcs.push(HalfEdge {
            target: from,
            twin: a,
            prev: NONE,
            next: NONE,
            edge,
        });
        (a, b)
    }

    /// Adds `arc` at the first (side 0) or last (side 1) end of `node`'s list.
    fn attach(&mut self, node: usize, arc: usize, side: usize) {
        let Node { first, last, .. } = self.nodes[node];
        if first == NONE {
            self.nodes[node].first = arc;
            self.nodes[node].last = arc;
        } else if side == 0 {
            self.arcs[arc].next = first;
            self.arcs[first].prev = arc;
            self.nodes[node].first = arc;
        } else {
            self.arcs[arc].prev = last;
            self.arcs[last].next = arc;
            self.nodes[node].last = arc;
        }
    }

    fn reverse_list(&mut self, node: usize) {
        let mut arc = self.nodes[node].first;
        while arc != NONE {
            let HalfEdge { prev, next, .. } = self.arcs[arc];
            self.arcs[arc].prev = next;
            self.arcs[arc].next = prev;
            arc = next;
        }
        let Node { first, last, .. } = self.nodes[node];
        self.nodes[node].first = last;
        self.nodes[node].last = first;
    }

    /// Moves every arc of `root` onto `vertex`, at the `side` end of its list.
    fn absorb(&mut self, vertex: usize, side: usize, root: usize) {
        let mut arc = self.nodes[root].first;
        while arc != NONE {
            let twin = self.arcs[arc].twin;
            self.arcs[twin].target = vertex;
            arc = self.arcs[arc].next;
        }
        let Node {
            first: rf, last: rl, ..
        } = self.nodes[root];
        if rf == NONE {
            return;
        }
        let Node {
            first: wf, last: wl, ..
        } = self.nodes[vertex];
        if wf == NONE {
            self.nodes[vertex].first = rf;
            self.nodes[vertex].last = rl;
        } else if side == 1 {
            self.arcs[wl].next = rf;
            self.arcs[rf].prev = wl;
            self.nodes[vertex].last = rl;
        } else {
            self.arcs[rl].next = wf;
            self.arcs[wf].prev = rl;
            self.nodes[vertex].first = rf;
        }
        self.nodes[root].first = NONE;
        self.nodes[root].last = NONE;
    }

    /// Next node along the external face leaving `w`, which was entered
    /// from side `w_in`, and the side by which that node is entered.
    fn successor(&self, w: usize, w_in: usize) -> (usize, usize) {
        let s = self.nodes[w].ext[1 ^ w_in];
        let [s0, s1] = self.nodes[s].ext;
        let s_in = if s0 == w && s1 == w {
            w_in
        } else if s0 == w {
            0
        } else {
            1
        };
        (s, s_in)
    }

    fn is_pertinent(&self, w: usize, v: usize) -> bool {
        w < self.n && (self.backedge_flag[w] == v || !self.pertinent_roots[w].is_empty())
    }

    fn is_externally_active(&self, w: usize, v: usize) -> bool {
        w < self.n
            && (self.least_ancestor[w] < v
                || (self.sep_head[w] != NONE && self.lowpoint[self.sep_head[w]] < v))
    }

    fn is_internally_active(&self, w: usize, v: usize) -> bool {
        self.is_pertinent(w, v) && !self.is_externally_active(w, v)
    }

    fn is_inactive(&self, w: usize, v: usize) -> bool {
        !self.is_pertinent(w, v) && !self.is_externally_active(w, v)
    }

    fn active_successor(&self, start: usize, w_in: usize, v: usize) -> (usize, usize) {
        let (mut w, mut w_in) = self.successor(start, w_in);
        while w != start && self.is_inactive(w, v) {
            (w, w_in) = self.successor(w, w_in);
        }
        (w, w_in)
    }

    fn run(&mut self) -> bool {
        for v in (0..self.n).rev() {
            let back_edges = std::mem::take(&mut self.forward[v]);
            for &(w, edge) in &back_edges {
                self.walk_up(v, w, edge);
            }
            let children = std::mem::take(&mut self.children[v]);
            for &c in &children {
                self.walk_down(v, self.n + c);
            }
            if back_edges.iter().any(|&(w, _)| self.backedge_flag[w] == v) {
                return false;
            }
        }
        true
    }

    /// Marks the bicomponents between `w` and `v` as pertinent.
    fn walk_up(&mut self, v: usize, w: usize, edge: usize) {
        let n = self.n;
        self.backedge_flag[w] = v;
        self.pertinent_edge[w] = edge;
        let (mut x, mut x_in) = (w, 1);
        let (mut y, mut y_in) = (w, 0);
        while x != v {
            if self.visited[x] == v || self.visited[y] == v {
                break;
            }
            self.visited[x] = v;
            self.visited[y] = v;
            let root = if x >= n {
                x
            } else if y >= n {
                y
            } else {
                NONE
            };
            if root != NONE {
                let c = root - n;
                let z = self.parent[c];
                if z != v {
                    if self.lowpoint[c] < v {
                        self.pertinent_roots[z].push_back(root);
                    } else {
                        self.pertinent_roots[z].push_front(root);
                    }
                }
                (x, x_in) = (z, 1);
                (y, y_in) = (z, 0);
            } else {
                (x, x_in) = self.successor(x, x_in);
                (y, y_in) = self.successor(y, y_in);
            }
        }
    }

    /// Embeds the pending back edges from `v` into the bicomponent rooted at
    /// `root`, merging pertinent child bicomponents on the way.
    fn walk_down(&mut self, v: usize, root: usize) {
        let n = self.n;
        let mut merges: Vec<(usize, usize)> = Vec::new();
        for root_out in 0..2 {
            let (mut w, mut w_in) = self.successor(root, 1 ^ root_out);
            while w != root {
                if w < n && self.backedge_flag[w] == v {
                    while let (Some((r, r_out)), Some((p, p_in))) = (merges.pop(), merges.pop()) {
                        self.merge(p, p_in, r, r_out);
                    }
                    self.embed_back_edge(root, root_out, w, w_in);
                    self.backedge_flag[w] = NONE;
                }
                let child_root = if w < n {
                    self.pertinent_roots[w].front().copied()
                } else {
                    None
                };
                if let Some(child_root) = child_root {
                    merges.push((w, w_in));
                    let (x, x_in) = self.active_successor(child_root, 1, v);
                    let (y, y_in) = self.active_successor(child_root, 0, v);
                    let child_out = if self.is_internally_active(x, v) {
                        0
                    } else if self.is_internally_active(y, v) {
                        1
                    } else if self.is_pertinent(x, v) {
                        0
                    } else {
                        1
                    };
                    merges.push((child_root, child_out));
                    (w, w_in) = if child_out == 0 { (x, x_in) } else { (y, y_in) };
                } else if self.is_inactive(w, v) {
                    (w, w_in) = self.successor(w, w_in);
                } else {
                    // stopping vertex: short-circuit the inactive stretch, but
                    // never down to a two-node face whose entry side is ambiguous
                    if self.lowpoint[root - n] < v
                        && merges.is_empty()
                        && self.nodes[root].ext[1 ^ root_out] != w
                        && self.nodes[w].ext[1 ^ w_in] != root
                    {
                        self.nodes[root].ext[root_out] = w;
                        self.nodes[w].ext[w_in] = root;
                    }
                    break;
                }
            }
            if !merges.is_empty() {
                break;
            }
        }
    }

    fn embed_back_edge(&mut self, root: usize, root_out: usize, w: usize, w_in: usize) {
        let edge = self.pertinent_edge[w];
        let (a, b) = self.new_arc_pair(root, w, edge);
        self.attach(root, a, root_out);
        self.attach(w, b, w_in);
        self.nodes[root].ext[root_out] = w;
        self.nodes[w].ext[w_in] = root;
    }

    /// Merges the bicomponent rooted at `root` into `w`, flipping it first
    /// when the walk leaves `root` on the same side it entered `w`.
    fn merge(&mut self, w: usize, w_in: usize, root: usize, mut root_out: usize) {
        let c = root - self.n;
        if w_in == root_out {
            self.reverse_list(root);
            self.nodes[root].ext.swap(0, 1);
            self.inverted[c] = !self.inverted[c];
            root_out ^= 1;
        }
        let far = self.nodes[root].ext[1 ^ root_out];
        self.nodes[w].ext[w_in] = far;
        for side in 0..2 {
            if self.nodes[far].ext[side] == root {
                self.nodes[far].ext[side] = w;
            }
        }
        self.absorb(w, w_in, root);

        if self.pertinent_roots[w].front() == Some(&root) {
            self.pertinent_roots[w].pop_front();
        } else {
            self.pertinent_roots[w].retain(|&r| r != root);
        }
        self.unlink_child(w, c);
    }

    fn unlink_child(&mut self, parent: usize, c: usize) {
        let (prev, next) = (self.sep_prev[c], self.sep_next[c]);
        if prev == NONE {
            if self.sep_head[parent] == c {
                self.sep_head[parent] = next;
            }
        } else {
            self.sep_next[prev] = next;
        }
        if next != NONE {
            self.sep_prev[next] = prev;
        }
        self.sep_prev[c] = NONE;
        self.sep_next[c] = NONE;
    }

    /// Joins the remaining separate bicomponents, fixes orientations and
    /// reads the rotation of every input vertex.
    fn rotations(&mut self) -> Vec<Vec<usize>> {
        let n = self.n;
        for c in 0..n {
            let p = self.parent[c];
            if p != NONE {
                self.absorb(p, 1, n + c);
            }
        }
        let mut flipped = vec![false; n];
        for v in 0..n {
            let p = self.parent[v];
            if p != NONE {
                flipped[v] = flipped[p] ^ self.inverted[v];
            }
        }
        let mut rotations = vec![Vec::new(); n];
        for v in 0..n {
            let mut order = Vec::new();
            let mut arc = self.nodes[v].first;
            while arc != NONE {
                order.push(self.arcs[arc].edge);
                arc = self.arcs[arc].next;
            }
            if flipped[v] {
                order.reverse();
            }
            rotations[self.vertex_of[v]] = order;
        }
        rotations
    }
}
