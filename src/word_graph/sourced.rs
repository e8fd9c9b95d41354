//! Word graph with in-edge bookkeeping and a node manager.
//!
//! This is the mutable core of Todd–Coxeter coset enumeration: the flat
//! target table of [`WordGraph`](super::WordGraph) extended with
//!
//! - per-`(node, letter)` singly linked *source lists* (`first_source` /
//!   `next_source`), so that all in-edges of a dying node can be redirected
//!   in time proportional to its in-degree;
//! - a union-find over nodes, so queued coincidences stay meaningful while
//!   earlier merges proceed;
//! - a free list, so dead node slots are recycled instead of removed and
//!   node indices stay dense.
//!
//! Invariants between coincidence drains:
//!
//! - every active node's out-edges point at active nodes;
//! - `s` is on the source list of `(t, a)` iff `target(s, a) == t`;
//! - `find(n) == n` for every active node.

use super::{Node, UNDEFINED};
use crate::word::Letter;

/// Observer for the side effects of a node merge.
///
/// `coincide` reports conflicting targets that must themselves merge;
/// `copied` reports out-edges inducted onto the surviving node; and
/// `redirected` reports in-edges whose target changed. The latter two
/// exist for Felsch deduction bookkeeping and default to no-ops.
pub(crate) trait MergeEvents {
    fn coincide(&mut self, a: Node, b: Node);

    fn copied(&mut self, _node: Node, _letter: Letter) {}

    fn redirected(&mut self, _source: Node, _letter: Letter) {}
}

/// Collects coincidences only; used where copies are irrelevant.
impl MergeEvents for Vec<(Node, Node)> {
    fn coincide(&mut self, a: Node, b: Node) {
        self.push((a, b));
    }
}

/// Sourced word graph plus node manager. Crate-internal: engines own one
/// and expose plain [`WordGraph`](super::WordGraph) snapshots.
#[derive(Debug, Clone)]
pub(crate) struct SourcedWordGraph {
    out_degree: usize,
    targets: Vec<Node>,
    first_source: Vec<Node>,
    next_source: Vec<Node>,
    parent: Vec<Node>,
    active: Vec<bool>,
    free: Vec<Node>,
    active_count: usize,
}

impl SourcedWordGraph {
    pub(crate) fn new(nodes: usize, out_degree: usize) -> Self {
        Self {
            out_degree,
            targets: vec![UNDEFINED; nodes * out_degree],
            first_source: vec![UNDEFINED; nodes * out_degree],
            next_source: vec![UNDEFINED; nodes * out_degree],
            parent: (0..nodes as Node).collect(),
            active: vec![true; nodes],
            free: Vec::new(),
            active_count: nodes,
        }
    }

    pub(crate) fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Total slots, live and dead.
    pub(crate) fn number_of_nodes(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn number_of_nodes_active(&self) -> usize {
        self.active_count
    }

    pub(crate) fn is_active(&self, node: Node) -> bool {
        self.active[node as usize]
    }

    /// Iterates over the active nodes in index order.
    pub(crate) fn active_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a)
            .map(|(i, _)| i as Node)
    }

    #[inline]
    fn offset(&self, node: Node, letter: Letter) -> usize {
        node as usize * self.out_degree + usize::from(letter)
    }

    #[inline]
    pub(crate) fn target(&self, node: Node, letter: Letter) -> Node {
        self.targets[self.offset(node, letter)]
    }

    /// Head of the in-edge list of `(node, letter)`.
    #[inline]
    pub(crate) fn first_source_of(&self, node: Node, letter: Letter) -> Node {
        self.first_source[self.offset(node, letter)]
    }

    /// Successor of `source` in the in-edge list it belongs to for
    /// `letter`.
    #[inline]
    pub(crate) fn next_source_of(&self, source: Node, letter: Letter) -> Node {
        self.next_source[self.offset(source, letter)]
    }

    /// Allocates an active node, recycling a dead slot when one exists.
    pub(crate) fn new_node(&mut self) -> Node {
        if let Some(node) = self.free.pop() {
            self.active[node as usize] = true;
            self.parent[node as usize] = node;
            self.active_count += 1;
            node
        } else {
            let node = self.active.len() as Node;
            self.active.push(true);
            self.parent.push(node);
            self.targets
                .resize(self.targets.len() + self.out_degree, UNDEFINED);
            self.first_source
                .resize(self.first_source.len() + self.out_degree, UNDEFINED);
            self.next_source
                .resize(self.next_source.len() + self.out_degree, UNDEFINED);
            self.active_count += 1;
            node
        }
    }

    /// Representative of `node` under the merges performed so far.
    pub(crate) fn find(&mut self, node: Node) -> Node {
        let mut n = node;
        while self.parent[n as usize] != n {
            // Path halving.
            let p = self.parent[n as usize];
            self.parent[n as usize] = self.parent[p as usize];
            n = self.parent[n as usize];
        }
        n
    }

    /// Defines `(src, letter) → dst`, maintaining source lists.
    pub(crate) fn set_target(&mut self, src: Node, letter: Letter, dst: Node) {
        if self.target(src, letter) != UNDEFINED {
            self.remove_target(src, letter);
        }
        let offset = self.offset(src, letter);
        self.targets[offset] = dst;
        let head = self.offset(dst, letter);
        self.next_source[offset] = self.first_source[head];
        self.first_source[head] = src;
    }

    /// Undefines `(src, letter)`, unlinking `src` from the old target's
    /// source list. O(in-degree of the old target).
    pub(crate) fn remove_target(&mut self, src: Node, letter: Letter) {
        let offset = self.offset(src, letter);
        let dst = self.targets[offset];
        if dst == UNDEFINED {
            return;
        }
        let head = self.offset(dst, letter);
        if self.first_source[head] == src {
            self.first_source[head] = self.next_source[offset];
        } else {
            let mut s = self.first_source[head];
            loop {
                let next_offset = self.offset(s, letter);
                if self.next_source[next_offset] == src {
                    self.next_source[next_offset] = self.next_source[offset];
                    break;
                }
                s = self.next_source[next_offset];
                debug_assert_ne!(s, UNDEFINED, "source list invariant broken");
            }
        }
        self.targets[offset] = UNDEFINED;
        self.next_source[offset] = UNDEFINED;
    }

    /// Raw target write without source bookkeeping (bulk collapse mode).
    pub(crate) fn set_target_raw(&mut self, src: Node, letter: Letter, dst: Node) {
        let offset = self.offset(src, letter);
        self.targets[offset] = dst;
    }

    /// Raw target removal without source bookkeeping (bulk collapse mode).
    pub(crate) fn remove_target_raw(&mut self, src: Node, letter: Letter) {
        let offset = self.offset(src, letter);
        self.targets[offset] = UNDEFINED;
    }

    /// Merges `max` into `min`: redirects in-edges, inducts out-edges, and
    /// frees `max`. Side effects are reported through `events`.
    ///
    /// `max` must be active and distinct from `min`; both must be
    /// representatives.
    pub(crate) fn merge_nodes<E: MergeEvents>(&mut self, min: Node, max: Node, events: &mut E) {
        debug_assert!(self.active[min as usize] && self.active[max as usize]);
        debug_assert_ne!(min, max);
        self.parent[max as usize] = min;
        self.active[max as usize] = false;
        self.active_count -= 1;

        for letter in 0..self.out_degree as u8 {
            // Out-edges of max first: this unlinks any self-loop of max
            // from its own source list before the in-edge pass.
            let t = self.target(max, letter);
            if t != UNDEFINED {
                self.remove_target(max, letter);
                let t = if t == max { min } else { t };
                let existing = self.target(min, letter);
                if existing == UNDEFINED {
                    self.set_target(min, letter, t);
                    events.copied(min, letter);
                } else if existing != t {
                    events.coincide(t, existing);
                }
            }
        }

        for letter in 0..self.out_degree as u8 {
            // In-edges of max: redirect the whole source list to min.
            let head = self.offset(max, letter);
            let mut s = self.first_source[head];
            self.first_source[head] = UNDEFINED;
            while s != UNDEFINED {
                let offset = self.offset(s, letter);
                let next = self.next_source[offset];
                debug_assert_eq!(self.targets[offset], max);
                self.targets[offset] = min;
                let min_head = self.offset(min, letter);
                self.next_source[offset] = self.first_source[min_head];
                self.first_source[min_head] = s;
                events.redirected(s, letter);
                s = next;
            }
        }

        self.free.push(max);
    }

    /// Merges `max` into `min` without any source bookkeeping; used by the
    /// bulk (large-collapse) drain, which rebuilds sources afterwards.
    pub(crate) fn merge_nodes_raw<E: MergeEvents>(&mut self, min: Node, max: Node, events: &mut E) {
        self.parent[max as usize] = min;
        self.active[max as usize] = false;
        self.active_count -= 1;
        for letter in 0..self.out_degree as u8 {
            let t = self.target(max, letter);
            if t != UNDEFINED {
                self.remove_target_raw(max, letter);
                let existing = self.target(min, letter);
                if existing == UNDEFINED {
                    self.set_target_raw(min, letter, t);
                    events.copied(min, letter);
                } else if existing != t {
                    events.coincide(t, existing);
                }
            }
        }
        self.free.push(max);
    }

    /// Canonicalises every target through `find` and rebuilds the source
    /// lists from scratch. Used after a bulk drain.
    pub(crate) fn rebuild_sources(&mut self) {
        self.first_source.fill(UNDEFINED);
        self.next_source.fill(UNDEFINED);
        let nodes = self.number_of_nodes() as Node;
        for node in 0..nodes {
            if !self.active[node as usize] {
                continue;
            }
            for letter in 0..self.out_degree as u8 {
                let offset = self.offset(node, letter);
                let t = self.targets[offset];
                if t == UNDEFINED {
                    continue;
                }
                let t = self.find(t);
                self.targets[offset] = t;
                let head = self.offset(t, letter);
                self.next_source[offset] = self.first_source[head];
                self.first_source[head] = node;
            }
        }
    }

    /// Snapshot of the targets as a plain word graph (dead rows included,
    /// cleared).
    pub(crate) fn to_word_graph(&self) -> super::WordGraph {
        let mut graph = super::WordGraph::new(self.number_of_nodes(), self.out_degree);
        for node in self.active_nodes().collect::<Vec<_>>() {
            for letter in 0..self.out_degree as u8 {
                let t = self.target(node, letter);
                if t != UNDEFINED {
                    graph.set_target(node, letter, t);
                }
            }
        }
        graph
    }

    /// Follows `word` from `src` over active targets.
    pub(crate) fn follow_path(&self, src: Node, word: &[Letter]) -> Node {
        let mut current = src;
        for &letter in word {
            current = self.target(current, letter);
            if current == UNDEFINED {
                return UNDEFINED;
            }
        }
        current
    }
}
