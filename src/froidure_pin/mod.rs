//! # Froidure–Pin Engine
//!
//! Breadth-first enumeration of the semigroup generated by a set of
//! concrete elements (any [`Element`] kernel): elements are discovered in
//! order of word length over the generators, producing
//!
//! - the element ↔ index bijection,
//! - the right (and left) Cayley graphs,
//! - the defining rules of the semigroup with respect to its generators,
//! - a shortlex-minimal factorisation of every element.
//!
//! ## Invariants
//!
//! After every enumeration step:
//!
//! 1. `word(i)` (recovered through `prefix`/`final`) is the
//!    shortlex-least expression of `elements[i]`;
//! 2. the processed prefix of `elements` is closed under right
//!    multiplication by generators;
//! 3. the right Cayley edge `(i, a)` points to `elements[i] ·
//!    generators[a]`.
//!
//! Products are composed through the kernel only when the candidate word
//! is possibly new; products whose suffix already reduces are resolved by
//! table tracing, which is what makes the enumeration cheap for kernels
//! with an expensive [`Element::complexity`].
//!
//! Runs unboundedly on infinite semigroups; bound them externally with
//! [`FroidurePin::run_for`] or [`FroidurePin::run_until`].

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::time::Duration;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use thiserror::Error;
use tracing::{debug, info};

use crate::element::Element;
use crate::runner::{RunState, StopPolicy, reporting_enabled};
use crate::word::{Letter, Word};
use crate::word_graph::WordGraph;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`FroidurePin`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FroidurePinError {
    /// A mutation was attempted on an immutable or started engine.
    #[error("engine not ready: {0}")]
    EngineNotReady(String),

    /// Generators of differing degrees were supplied.
    #[error("degree mismatch: generator has degree {found}, expected {expected}")]
    DegreeMismatch {
        /// Degree of the offending generator.
        found: usize,
        /// Degree of the first generator.
        expected: usize,
    },

    /// A queried element is not in the semigroup.
    #[error("element does not belong to the semigroup")]
    NotAnElement,

    /// A letter or index was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ------------------------------------------------------------------------------------------------
// Configuration
// ------------------------------------------------------------------------------------------------

/// Configuration for a [`FroidurePin`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FroidurePinConfig {
    /// Elements processed between checkpoints on large enumerations.
    pub batch_size: usize,

    /// Size below which `run` completes without yielding at batch
    /// boundaries.
    pub concurrency_threshold: usize,

    /// When set, `add_generator` is refused outright.
    pub immutable: bool,
}

impl Default for FroidurePinConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            concurrency_threshold: 823_543,
            immutable: false,
        }
    }
}

const UNDEF: usize = usize::MAX;

// ------------------------------------------------------------------------------------------------
// Engine
// ------------------------------------------------------------------------------------------------

/// Froidure–Pin enumeration of the semigroup generated by concrete
/// elements.
#[derive(Debug)]
pub struct FroidurePin<T: Element> {
    config: FroidurePinConfig,
    generators: Vec<T>,
    /// Letter → element index (duplicate generators share an index).
    letter_to_pos: Vec<usize>,
    elements: IndexSet<T, FxBuildHasher>,
    first: Vec<Letter>,
    last: Vec<Letter>,
    prefix: Vec<usize>,
    suffix: Vec<usize>,
    length: Vec<usize>,
    /// `reduced[i * gens + a]`: is `word(i) · a` the minimal word of
    /// `right[i][a]`?
    reduced: Vec<bool>,
    right: Vec<usize>,
    left: Vec<usize>,
    rules: Vec<(Word, Word)>,
    /// Next index whose right Cayley row is to be computed.
    pos: usize,
    /// Next index whose left Cayley row is to be computed.
    left_pos: usize,
    /// Word length of the wave currently being processed.
    wave_length: usize,
    state: RunState,
}

impl<T: Element> FroidurePin<T> {
    /// An engine over the given generators with default configuration.
    pub fn new(generators: Vec<T>) -> Result<Self, FroidurePinError> {
        Self::with_config(generators, FroidurePinConfig::default())
    }

    /// An engine with explicit configuration.
    pub fn with_config(
        generators: Vec<T>,
        config: FroidurePinConfig,
    ) -> Result<Self, FroidurePinError> {
        let mut engine = Self {
            config,
            generators: Vec::new(),
            letter_to_pos: Vec::new(),
            elements: IndexSet::default(),
            first: Vec::new(),
            last: Vec::new(),
            prefix: Vec::new(),
            suffix: Vec::new(),
            length: Vec::new(),
            reduced: Vec::new(),
            right: Vec::new(),
            left: Vec::new(),
            rules: Vec::new(),
            pos: 0,
            left_pos: 0,
            wave_length: 1,
            state: RunState::NotStarted,
        };
        for generator in generators {
            engine.push_generator(generator)?;
        }
        Ok(engine)
    }

    fn push_generator(&mut self, generator: T) -> Result<(), FroidurePinError> {
        if let Some(first) = self.generators.first()
            && first.degree() != generator.degree()
        {
            return Err(FroidurePinError::DegreeMismatch {
                found: generator.degree(),
                expected: first.degree(),
            });
        }
        let letter = self.generators.len();
        if letter >= 256 {
            return Err(FroidurePinError::InvalidArgument(
                "at most 256 generators".to_string(),
            ));
        }
        self.generators.push(generator.clone());
        let (index, fresh) = self.elements.insert_full(generator);
        self.letter_to_pos.push(index);
        if fresh {
            self.first.push(letter as Letter);
            self.last.push(letter as Letter);
            self.prefix.push(UNDEF);
            self.suffix.push(UNDEF);
            self.length.push(1);
        } else {
            // Duplicate generator: recorded as a rule, not an element.
            self.rules
                .push((vec![letter as Letter], vec![self.first[index]]));
        }
        Ok(())
    }

    /// Adds a generator to a not-yet-started, mutable engine.
    pub fn add_generator(&mut self, generator: T) -> Result<(), FroidurePinError> {
        if self.config.immutable {
            return Err(FroidurePinError::EngineNotReady(
                "engine is immutable".to_string(),
            ));
        }
        if self.state.started() {
            return Err(FroidurePinError::EngineNotReady(
                "generators cannot be added after run".to_string(),
            ));
        }
        self.push_generator(generator)
    }

    // --------------------------------------------------------------------------------------------
    // Running
    // --------------------------------------------------------------------------------------------

    /// Whether enumeration is complete.
    pub fn finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Runs the enumeration to closure.
    pub fn run(&mut self) {
        self.run_with_policy(StopPolicy::none(), |_| false);
    }

    /// Runs for at most `duration` (checked at batch boundaries).
    pub fn run_for(&mut self, duration: Duration) {
        self.run_with_policy(StopPolicy::timeout(duration), |_| false);
    }

    /// Runs until `predicate` fires at a batch boundary.
    pub fn run_until<P>(&mut self, predicate: P)
    where
        P: FnMut(&Self) -> bool,
    {
        self.run_with_policy(StopPolicy::none(), predicate);
    }

    fn run_with_policy<P>(&mut self, policy: StopPolicy, mut predicate: P)
    where
        P: FnMut(&Self) -> bool,
    {
        if self.finished() {
            return;
        }
        self.state = RunState::Running;
        let mut since_checkpoint = 0usize;
        loop {
            if self.pos == self.elements.len() {
                // Closed: complete the final wave's left rows.
                self.left_pass(self.elements.len());
                self.state = RunState::Finished;
                info!(
                    size = self.elements.len(),
                    rules = self.rules.len(),
                    "Froidure-Pin enumeration finished"
                );
                return;
            }
            if self.length[self.pos] > self.wave_length {
                self.left_pass(self.pos);
                self.wave_length = self.length[self.pos];
                debug!(
                    wave = self.wave_length,
                    size = self.elements.len(),
                    "starting next word-length wave"
                );
            }
            self.right_row(self.pos);
            self.pos += 1;
            since_checkpoint += 1;

            if since_checkpoint >= self.config.batch_size {
                since_checkpoint = 0;
                if reporting_enabled() {
                    info!(
                        size = self.elements.len(),
                        processed = self.pos,
                        "Froidure-Pin progress"
                    );
                }
                // Below the concurrency threshold the run completes
                // without yielding at batch boundaries.
                if self.elements.len() >= self.config.concurrency_threshold
                    && (policy.should_stop() || predicate(self))
                {
                    self.state = RunState::Stopped;
                    return;
                }
            }
        }
    }

    /// Computes the right Cayley row of element `i`.
    fn right_row(&mut self, i: usize) {
        let n = self.generators.len();
        // Grow the flat tables on demand for this row.
        if self.right.len() < (i + 1) * n {
            self.right.resize((i + 1) * n, UNDEF);
            self.reduced.resize((i + 1) * n, false);
        }
        for a in 0..n {
            let target = if self.length[i] == 1 {
                self.product_by_composition(i, a)
            } else {
                let v = self.suffix[i];
                let p = self.right[v * n + a];
                debug_assert_ne!(p, UNDEF);
                if !self.reduced[v * n + a] {
                    // word(v)·a already reduces: trace b·word(p) instead
                    // of composing.
                    let b = self.first[i];
                    if self.length[p] == 1 {
                        self.right[self.letter_to_pos[usize::from(b)] * n
                            + usize::from(self.last[p])]
                    } else {
                        let x = self.left[self.prefix[p] * n + usize::from(b)];
                        debug_assert_ne!(x, UNDEF);
                        self.right[x * n + usize::from(self.last[p])]
                    }
                } else {
                    self.product_by_composition(i, a)
                }
            };
            debug_assert_ne!(target, UNDEF);
            self.right[i * n + a] = target;
        }
    }

    /// Composes `elements[i] · generators[a]`, inserting the product when
    /// new; records a rule when the candidate word hits an old element.
    fn product_by_composition(&mut self, i: usize, a: usize) -> usize {
        let n = self.generators.len();
        let product = self.elements[i].compose(&self.generators[a]);
        let (index, fresh) = self.elements.insert_full(product);
        if fresh {
            self.first.push(self.first[i]);
            self.last.push(a as Letter);
            self.prefix.push(i);
            self.suffix.push(if self.length[i] == 1 {
                self.letter_to_pos[a]
            } else {
                self.right[self.suffix[i] * n + a]
            });
            self.length.push(self.length[i] + 1);
            self.reduced[i * n + a] = true;
        } else {
            let mut lhs = self.minimal_factorisation(i);
            lhs.push(a as Letter);
            let rhs = self.minimal_factorisation(index);
            if lhs != rhs {
                self.rules.push((lhs, rhs));
            }
        }
        index
    }

    /// Computes left Cayley rows for indices `[left_pos, end)`.
    fn left_pass(&mut self, end: usize) {
        let n = self.generators.len();
        if self.left.len() < end * n {
            self.left.resize(end * n, UNDEF);
        }
        for i in self.left_pos..end {
            for a in 0..n {
                let value = if self.length[i] == 1 {
                    // a · c for generators: generator a's right row.
                    let c = usize::from(self.last[i]);
                    self.right[self.letter_to_pos[a] * n + c]
                } else {
                    // a · (v c) = (a · v) · c.
                    let v = self.prefix[i];
                    let c = usize::from(self.last[i]);
                    let av = self.left[v * n + a];
                    debug_assert_ne!(av, UNDEF);
                    self.right[av * n + c]
                };
                debug_assert_ne!(value, UNDEF);
                self.left[i * n + a] = value;
            }
        }
        self.left_pos = end;
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    /// The size of the semigroup (runs to completion).
    pub fn size(&mut self) -> usize {
        self.run();
        self.elements.len()
    }

    /// Elements discovered so far, without running.
    pub fn current_size(&self) -> usize {
        self.elements.len()
    }

    /// The number of generators (letters), duplicates included.
    pub fn number_of_generators(&self) -> usize {
        self.generators.len()
    }

    /// Generator for `letter`.
    pub fn generator(&self, letter: Letter) -> &T {
        &self.generators[usize::from(letter)]
    }

    /// The common degree of the generators (0 when there are none).
    pub fn degree(&self) -> usize {
        self.generators.first().map_or(0, Element::degree)
    }

    /// The element at `index`.
    pub fn element(&self, index: usize) -> &T {
        self.elements.get_index(index).expect("index in range")
    }

    /// The index of `x` among the elements found so far.
    pub fn current_position(&self, x: &T) -> Option<usize> {
        self.elements.get_index_of(x)
    }

    /// The index of `x`, running the enumeration to completion first.
    pub fn position(&mut self, x: &T) -> Option<usize> {
        self.run();
        self.current_position(x)
    }

    /// Whether `x` belongs to the semigroup (runs to completion).
    pub fn contains(&mut self, x: &T) -> bool {
        self.position(x).is_some()
    }

    /// The shortlex-least word for the element at `index`.
    pub fn minimal_factorisation(&self, index: usize) -> Word {
        let mut letters = Vec::new();
        let mut current = index;
        loop {
            letters.push(self.last[current]);
            if self.prefix[current] == UNDEF {
                break;
            }
            current = self.prefix[current];
        }
        letters.reverse();
        letters
    }

    /// A shortlex-least factorisation of `x`, if `x` is an element.
    pub fn factorisation(&mut self, x: &T) -> Result<Word, FroidurePinError> {
        match self.position(x) {
            Some(index) => Ok(self.minimal_factorisation(index)),
            None => Err(FroidurePinError::NotAnElement),
        }
    }

    /// The defining rules discovered so far, as word pairs over the
    /// generator letters.
    pub fn rules(&self) -> &[(Word, Word)] {
        &self.rules
    }

    /// The number of rules discovered so far.
    pub fn number_of_rules(&self) -> usize {
        self.rules.len()
    }

    /// Whether the element at `index` is idempotent.
    pub fn is_idempotent(&self, index: usize) -> bool {
        let x = self.element(index);
        &x.compose(x) == x
    }

    /// The number of idempotents (runs to completion).
    pub fn number_of_idempotents(&mut self) -> usize {
        self.run();
        (0..self.elements.len())
            .filter(|&i| self.is_idempotent(i))
            .count()
    }

    /// The right Cayley graph over the processed elements (runs to
    /// completion).
    pub fn right_cayley_graph(&mut self) -> WordGraph {
        self.run();
        let n = self.generators.len();
        let mut graph = WordGraph::new(self.elements.len(), n);
        for i in 0..self.elements.len() {
            for a in 0..n {
                graph.set_target(i as u32, a as Letter, self.right[i * n + a] as u32);
            }
        }
        graph
    }

    /// The left Cayley graph over the processed elements (runs to
    /// completion).
    pub fn left_cayley_graph(&mut self) -> WordGraph {
        self.run();
        let n = self.generators.len();
        let mut graph = WordGraph::new(self.elements.len(), n);
        for i in 0..self.elements.len() {
            for a in 0..n {
                graph.set_target(i as u32, a as Letter, self.left[i * n + a] as u32);
            }
        }
        graph
    }

    /// The right Cayley target `elements[i] · generators[a]`, if already
    /// computed.
    pub fn right_target(&self, index: usize, letter: Letter) -> Option<usize> {
        let n = self.generators.len();
        match self.right.get(index * n + usize::from(letter)) {
            Some(&t) if t != UNDEF => Some(t),
            _ => None,
        }
    }

    /// Iterates over the elements in discovery (shortlex word) order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }
}

impl<T: Element> fmt::Display for FroidurePin<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} FroidurePin with {} generators + {} elements, {} rules>",
            if self.finished() {
                "finished"
            } else {
                "partially enumerated"
            },
            self.generators.len(),
            self.elements.len(),
            self.rules.len()
        )
    }
}
