//! # Action / Orbit Module
//!
//! Given a set of generators acting on a point type (on the left or on the
//! right), compute the orbit of one or more seed points: a bijection
//! point ↔ dense index, the orbit graph (a [`WordGraph`] whose letter `a`
//! edges apply generator `a`), and a Schreier spanning tree for recovering
//! a witness word to every point.
//!
//! ## Design Invariants
//!
//! - Points are discovered breadth-first, so the Schreier tree yields a
//!   shortest witness word (in generator count) for every point.
//! - Point indices are stable: enumeration only appends.
//! - The orbit graph is complete on the processed prefix of points.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::hash::Hash;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::word::{Letter, Word};
use crate::word_graph::{Node, UNDEFINED, WordGraph};

// ------------------------------------------------------------------------------------------------
// Types
// ------------------------------------------------------------------------------------------------

/// Which side the generators act on. Cosmetic: the action callback already
/// encodes the side; the tag makes intent visible at construction sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSide {
    /// Generators act on the left: `g · p`.
    Left,

    /// Generators act on the right: `p · g`.
    Right,
}

/// The orbit of a seed set under a generator set.
///
/// `F` computes the action of one generator on one point; the orbit is
/// closed breadth-first under all generators.
#[derive(Debug)]
pub struct Action<E, P, F>
where
    P: Hash + Eq + Clone,
    F: Fn(&E, &P) -> P,
{
    side: ActionSide,
    generators: Vec<E>,
    act: F,
    points: IndexSet<P, FxBuildHasher>,
    graph: WordGraph,
    tree: Vec<(Node, Letter)>,
    frontier: usize,
}

impl<E, P, F> Action<E, P, F>
where
    P: Hash + Eq + Clone,
    F: Fn(&E, &P) -> P,
{
    /// An empty orbit with the given generators and action callback.
    ///
    /// At most 256 generators are supported (orbit graph letters are
    /// byte-sized).
    pub fn new(side: ActionSide, generators: Vec<E>, act: F) -> Self {
        assert!(generators.len() <= 256, "at most 256 generators");
        let out_degree = generators.len();
        Self {
            side,
            generators,
            act,
            points: IndexSet::default(),
            graph: WordGraph::new(0, out_degree),
            tree: Vec::new(),
            frontier: 0,
        }
    }

    /// The side this action was declared with.
    pub fn side(&self) -> ActionSide {
        self.side
    }

    /// Adds a seed point; a no-op if the point is already in the orbit.
    pub fn add_seed(&mut self, point: P) -> usize {
        let (index, fresh) = self.points.insert_full(point);
        if fresh {
            self.graph.add_nodes(1);
            self.tree.push((UNDEFINED, 0));
        }
        index
    }

    /// Number of points discovered so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point has been seeded yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the orbit is closed under every generator.
    pub fn is_done(&self) -> bool {
        self.frontier == self.points.len()
    }

    /// The index of `point`, if already discovered.
    pub fn position(&self, point: &P) -> Option<usize> {
        self.points.get_index_of(point)
    }

    /// The point with the given index.
    pub fn point(&self, index: usize) -> &P {
        self.points.get_index(index).expect("index in orbit range")
    }

    /// The orbit graph over the processed prefix.
    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    /// Runs the enumeration to closure.
    pub fn run(&mut self) {
        while !self.is_done() {
            self.process_batch(usize::MAX);
        }
    }

    /// Processes at most `batch` frontier points; returns how many were
    /// processed. Used by engines that interleave orbit work.
    pub fn process_batch(&mut self, batch: usize) -> usize {
        let mut processed = 0;
        while processed < batch && self.frontier < self.points.len() {
            let index = self.frontier;
            for g in 0..self.generators.len() {
                let image = (self.act)(&self.generators[g], self.points.get_index(index).unwrap());
                let (target, fresh) = self.points.insert_full(image);
                if fresh {
                    self.graph.add_nodes(1);
                    self.tree.push((index as Node, g as Letter));
                }
                self.graph.set_target(index as Node, g as Letter, target as Node);
            }
            self.frontier += 1;
            processed += 1;
        }
        processed
    }

    /// A witness word of generator indices mapping a seed to point
    /// `index`, read in application order.
    pub fn word_to(&self, index: usize) -> Word {
        let mut letters = Vec::new();
        let mut current = index as Node;
        while self.tree[current as usize].0 != UNDEFINED {
            let (parent, letter) = self.tree[current as usize];
            letters.push(letter);
            current = parent;
        }
        letters.reverse();
        letters
    }
}
