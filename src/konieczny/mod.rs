//! # Konieczny Engine
//!
//! Green's-relations decomposition of a finite monoid given by a
//! generating set of elements whose kernel exposes the two one-sided
//! action values of [`GreensPoints`]:
//!
//! 1. the orbit of the identity's lambda value under the *right* action
//!    of the generators labels the L-classes, and the orbit of its rho
//!    value under the *left* action labels the R-classes;
//! 2. every element is tagged with the orbit indices of its own lambda
//!    and rho values;
//! 3. D-classes are the connected components of the bipartite incidence
//!    graph between realised lambda and rho labels (in a finite
//!    semigroup the join of L and R is D);
//! 4. H-classes are the realised `(lambda, rho)` pairs, and the group
//!    H-class of a regular D-class (its Schützenberger group) is
//!    computed lazily from an idempotent representative.
//!
//! A D-class is *regular* exactly when it contains an idempotent;
//! non-regular D-classes are excluded from the regular-D-class iterator
//! and carry no group H-class.

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

use crate::action::{Action, ActionSide};
use crate::element::{ElementWithOne, GreensPoints};
use crate::runner::{RunState, StopPolicy, reporting_enabled};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`Konieczny`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KoniecznyError {
    /// No generators were supplied.
    #[error("at least one generator is required")]
    NoGenerators,

    /// Generators of differing degrees were supplied.
    #[error("degree mismatch: generator has degree {found}, expected {expected}")]
    DegreeMismatch {
        /// Degree of the offending generator.
        found: usize,
        /// Degree of the first generator.
        expected: usize,
    },

    /// A queried element is not in the monoid.
    #[error("element does not belong to the monoid")]
    NotAnElement,
}

// ------------------------------------------------------------------------------------------------
// D-classes
// ------------------------------------------------------------------------------------------------

/// One D-class of the decomposed monoid.
#[derive(Debug, Clone)]
pub struct DClass<T> {
    rep: T,
    size: usize,
    rank: usize,
    idempotents: usize,
    regular: bool,
    lambda_indices: Vec<u32>,
    rho_indices: Vec<u32>,
    element_indices: Vec<u32>,
}

impl<T> DClass<T> {
    /// A representative element (the first one discovered).
    pub fn rep(&self) -> &T {
        &self.rep
    }

    /// The number of elements in this D-class.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The common rank of the class's elements.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether the class contains an idempotent.
    pub fn is_regular(&self) -> bool {
        self.regular
    }

    /// The number of idempotents in this D-class.
    pub fn number_of_idempotents(&self) -> usize {
        self.idempotents
    }

    /// The number of L-classes this D-class meets.
    pub fn number_of_l_classes(&self) -> usize {
        self.lambda_indices.len()
    }

    /// The number of R-classes this D-class meets.
    pub fn number_of_r_classes(&self) -> usize {
        self.rho_indices.len()
    }

    /// Whether the class is square (as many L- as R-classes).
    pub fn is_square(&self) -> bool {
        self.lambda_indices.len() == self.rho_indices.len()
    }
}

/// Classification of one element: the indices of its Green's classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreensIndices {
    /// D-class index.
    pub d: u32,
    /// L-class index (lambda orbit position).
    pub l: u32,
    /// R-class index (rho orbit position).
    pub r: u32,
    /// H-class index (realised lambda/rho pair).
    pub h: u32,
}

#[derive(Debug)]
struct Classification<T> {
    lambda_of: Vec<u32>,
    rho_of: Vec<u32>,
    d_of: Vec<u32>,
    h_of: Vec<u32>,
    d_classes: Vec<DClass<T>>,
    h_count: usize,
}

// ------------------------------------------------------------------------------------------------
// Engine
// ------------------------------------------------------------------------------------------------

fn act_lambda<T: GreensPoints>(g: &T, lambda: &T::Lambda) -> T::Lambda {
    g.lambda_act(lambda)
}

fn act_rho<T: GreensPoints>(g: &T, rho: &T::Rho) -> T::Rho {
    g.rho_act(rho)
}

type LambdaOrbit<T> =
    Action<T, <T as GreensPoints>::Lambda, fn(&T, &<T as GreensPoints>::Lambda) -> <T as GreensPoints>::Lambda>;
type RhoOrbit<T> =
    Action<T, <T as GreensPoints>::Rho, fn(&T, &<T as GreensPoints>::Rho) -> <T as GreensPoints>::Rho>;

/// Green's classification of the monoid generated by a set of elements
/// (the identity of the generators' degree is adjoined).
#[derive(Debug)]
pub struct Konieczny<T: GreensPoints + ElementWithOne> {
    generators: Vec<T>,
    lambda_orbit: LambdaOrbit<T>,
    rho_orbit: RhoOrbit<T>,
    elements: IndexSet<T, FxBuildHasher>,
    frontier: usize,
    batch_size: usize,
    state: RunState,
    classification: Option<Classification<T>>,
}

impl<T: GreensPoints + ElementWithOne> Konieczny<T> {
    /// An engine over the given generators.
    pub fn new(generators: Vec<T>) -> Result<Self, KoniecznyError> {
        let Some(first) = generators.first() else {
            return Err(KoniecznyError::NoGenerators);
        };
        let degree = first.degree();
        for g in &generators {
            if g.degree() != degree {
                return Err(KoniecznyError::DegreeMismatch {
                    found: g.degree(),
                    expected: degree,
                });
            }
        }
        let one = T::one_of_degree(degree);
        let mut lambda_orbit: LambdaOrbit<T> =
            Action::new(ActionSide::Right, generators.clone(), act_lambda::<T>);
        lambda_orbit.add_seed(one.lambda());
        let mut rho_orbit: RhoOrbit<T> =
            Action::new(ActionSide::Left, generators.clone(), act_rho::<T>);
        rho_orbit.add_seed(one.rho());

        let mut elements: IndexSet<T, FxBuildHasher> = IndexSet::default();
        elements.insert(one);
        for g in &generators {
            elements.insert(g.clone());
        }
        Ok(Self {
            generators,
            lambda_orbit,
            rho_orbit,
            elements,
            frontier: 0,
            batch_size: 8192,
            state: RunState::NotStarted,
            classification: None,
        })
    }

    /// The generators (identity excluded).
    pub fn generators(&self) -> &[T] {
        &self.generators
    }

    // --------------------------------------------------------------------------------------------
    // Running
    // --------------------------------------------------------------------------------------------

    /// Whether enumeration and classification are complete.
    pub fn finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Runs to completion.
    pub fn run(&mut self) {
        self.run_with_policy(StopPolicy::none());
    }

    /// Runs for at most `duration`, polled between batches.
    pub fn run_for(&mut self, duration: Duration) {
        self.run_with_policy(StopPolicy::timeout(duration));
    }

    fn run_with_policy(&mut self, policy: StopPolicy) {
        if self.finished() {
            return;
        }
        self.state = RunState::Running;
        // Phase 1: the two orbits (these label every later element).
        while !self.lambda_orbit.is_done() || !self.rho_orbit.is_done() {
            self.lambda_orbit.process_batch(self.batch_size);
            self.rho_orbit.process_batch(self.batch_size);
            if policy.should_stop() {
                self.state = RunState::Stopped;
                return;
            }
        }
        debug!(
            l_classes = self.lambda_orbit.len(),
            r_classes = self.rho_orbit.len(),
            "orbits complete"
        );
        // Phase 2: close the element set under right multiplication.
        while self.frontier < self.elements.len() {
            let end = (self.frontier + self.batch_size).min(self.elements.len());
            for i in self.frontier..end {
                for g in 0..self.generators.len() {
                    let product = self.elements[i].compose(&self.generators[g]);
                    self.elements.insert(product);
                }
            }
            self.frontier = end;
            if reporting_enabled() {
                info!(size = self.elements.len(), "Konieczny enumeration progress");
            }
            if policy.should_stop() {
                self.state = RunState::Stopped;
                return;
            }
        }
        // Phase 3: classify.
        self.classification = Some(self.classify());
        self.state = RunState::Finished;
        info!(
            size = self.elements.len(),
            d_classes = self.classification.as_ref().unwrap().d_classes.len(),
            "Konieczny classification finished"
        );
    }

    /// Tags every element with its lambda/rho orbit indices, groups the
    /// D-classes as incidence components, and computes per-class stats.
    fn classify(&self) -> Classification<T> {
        let n = self.elements.len();
        let l_count = self.lambda_orbit.len();
        let r_count = self.rho_orbit.len();

        let mut lambda_of = Vec::with_capacity(n);
        let mut rho_of = Vec::with_capacity(n);
        for x in self.elements.iter() {
            lambda_of.push(
                self.lambda_orbit
                    .position(&x.lambda())
                    .expect("element lambda lies in the orbit") as u32,
            );
            rho_of.push(
                self.rho_orbit
                    .position(&x.rho())
                    .expect("element rho lies in the orbit") as u32,
            );
        }

        // Union-find over lambda labels (0..l) and rho labels (l..l+r):
        // each element joins its two labels.
        let mut parent: Vec<u32> = (0..(l_count + r_count) as u32).collect();
        fn find(parent: &mut [u32], mut x: u32) -> u32 {
            while parent[x as usize] != x {
                parent[x as usize] = parent[parent[x as usize] as usize];
                x = parent[x as usize];
            }
            x
        }
        for i in 0..n {
            let a = find(&mut parent, lambda_of[i]);
            let b = find(&mut parent, rho_of[i] + l_count as u32);
            if a != b {
                parent[b as usize] = a;
            }
        }

        // Number the components in order of first element occurrence.
        let mut component_id: Vec<Option<u32>> = vec![None; l_count + r_count];
        let mut d_of = Vec::with_capacity(n);
        let mut d_classes: Vec<DClass<T>> = Vec::new();
        for i in 0..n {
            let root = find(&mut parent, lambda_of[i]) as usize;
            let d = match component_id[root] {
                Some(d) => d,
                None => {
                    let d = d_classes.len() as u32;
                    component_id[root] = Some(d);
                    d_classes.push(DClass {
                        rep: self.elements[i].clone(),
                        size: 0,
                        rank: self.elements[i].rank(),
                        idempotents: 0,
                        regular: false,
                        lambda_indices: Vec::new(),
                        rho_indices: Vec::new(),
                        element_indices: Vec::new(),
                    });
                    d
                }
            };
            d_of.push(d);
            let class = &mut d_classes[d as usize];
            class.size += 1;
            class.element_indices.push(i as u32);
            if !class.lambda_indices.contains(&lambda_of[i]) {
                class.lambda_indices.push(lambda_of[i]);
            }
            if !class.rho_indices.contains(&rho_of[i]) {
                class.rho_indices.push(rho_of[i]);
            }
            let x = &self.elements[i];
            if &x.compose(x) == x {
                class.idempotents += 1;
                class.regular = true;
            }
        }

        // H-classes: realised (lambda, rho) pairs.
        let mut h_pairs: IndexSet<(u32, u32), FxBuildHasher> = IndexSet::default();
        let mut h_of = Vec::with_capacity(n);
        for i in 0..n {
            let (h, _) = h_pairs.insert_full((lambda_of[i], rho_of[i]));
            h_of.push(h as u32);
        }

        Classification {
            lambda_of,
            rho_of,
            d_of,
            h_of,
            h_count: h_pairs.len(),
            d_classes,
        }
    }

    fn classification(&mut self) -> &Classification<T> {
        self.run();
        self.classification.as_ref().expect("classified after run")
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    /// The size of the monoid (runs to completion).
    pub fn size(&mut self) -> usize {
        self.run();
        self.elements.len()
    }

    /// Elements discovered so far.
    pub fn current_size(&self) -> usize {
        self.elements.len()
    }

    /// Number of D-classes.
    pub fn number_of_d_classes(&mut self) -> usize {
        self.classification().d_classes.len()
    }

    /// Number of L-classes.
    pub fn number_of_l_classes(&mut self) -> usize {
        self.run();
        self.lambda_orbit.len()
    }

    /// Number of R-classes.
    pub fn number_of_r_classes(&mut self) -> usize {
        self.run();
        self.rho_orbit.len()
    }

    /// Number of H-classes.
    pub fn number_of_h_classes(&mut self) -> usize {
        self.classification().h_count
    }

    /// Number of regular D-classes.
    pub fn number_of_regular_d_classes(&mut self) -> usize {
        self.classification()
            .d_classes
            .iter()
            .filter(|d| d.regular)
            .count()
    }

    /// Number of L-classes lying in regular D-classes.
    pub fn number_of_regular_l_classes(&mut self) -> usize {
        self.classification()
            .d_classes
            .iter()
            .filter(|d| d.regular)
            .map(|d| d.lambda_indices.len())
            .sum()
    }

    /// Number of R-classes lying in regular D-classes.
    pub fn number_of_regular_r_classes(&mut self) -> usize {
        self.classification()
            .d_classes
            .iter()
            .filter(|d| d.regular)
            .map(|d| d.rho_indices.len())
            .sum()
    }

    /// Number of elements lying in regular D-classes.
    pub fn number_of_regular_elements(&mut self) -> usize {
        self.classification()
            .d_classes
            .iter()
            .filter(|d| d.regular)
            .map(|d| d.size)
            .sum()
    }

    /// Number of idempotents.
    pub fn number_of_idempotents(&mut self) -> usize {
        self.classification()
            .d_classes
            .iter()
            .map(|d| d.idempotents)
            .sum()
    }

    /// The Green's class indices of `x`.
    pub fn greens_indices(&mut self, x: &T) -> Result<GreensIndices, KoniecznyError> {
        self.run();
        let index = self
            .elements
            .get_index_of(x)
            .ok_or(KoniecznyError::NotAnElement)?;
        let c = self.classification.as_ref().expect("classified after run");
        Ok(GreensIndices {
            d: c.d_of[index],
            l: c.lambda_of[index],
            r: c.rho_of[index],
            h: c.h_of[index],
        })
    }

    /// The D-class of `x`.
    pub fn d_class_of_element(&mut self, x: &T) -> Result<&DClass<T>, KoniecznyError> {
        let indices = self.greens_indices(x)?;
        Ok(&self.classification.as_ref().unwrap().d_classes[indices.d as usize])
    }

    /// All D-classes, in discovery order.
    pub fn d_classes(&mut self) -> impl Iterator<Item = &DClass<T>> {
        self.classification().d_classes.iter()
    }

    /// The regular D-classes only.
    pub fn regular_d_classes(&mut self) -> impl Iterator<Item = &DClass<T>> {
        self.classification().d_classes.iter().filter(|d| d.regular)
    }

    /// The elements of one D-class.
    pub fn d_class_elements(&mut self, d: &DClass<T>) -> Vec<T> {
        d.element_indices
            .iter()
            .map(|&i| self.elements[i as usize].clone())
            .collect()
    }

    /// The group H-class (Schützenberger group) of a regular D-class,
    /// computed lazily from an idempotent representative. `None` for
    /// non-regular classes.
    pub fn group_h_class(&mut self, d_index: usize) -> Option<Vec<T>> {
        self.run();
        let c = self.classification.as_ref().expect("classified after run");
        let class = c.d_classes.get(d_index)?;
        if !class.regular {
            return None;
        }
        let e_index = class
            .element_indices
            .iter()
            .copied()
            .find(|&i| {
                let x = &self.elements[i as usize];
                &x.compose(x) == x
            })
            .expect("a regular D-class contains an idempotent") as usize;
        let (el, er) = (c.lambda_of[e_index], c.rho_of[e_index]);
        Some(
            class
                .element_indices
                .iter()
                .copied()
                .filter(|&i| c.lambda_of[i as usize] == el && c.rho_of[i as usize] == er)
                .map(|i| self.elements[i as usize].clone())
                .collect(),
        )
    }

    // --------------------------------------------------------------------------------------------
    // Mid-run ("current") queries: never trigger a run
    // --------------------------------------------------------------------------------------------

    /// Number of D-classes among the elements discovered so far.
    pub fn current_number_of_d_classes(&self) -> usize {
        match &self.classification {
            Some(c) => c.d_classes.len(),
            None => self.classify_current(|c| c.d_classes.len()),
        }
    }

    /// Number of distinct L-class labels among discovered elements.
    pub fn current_number_of_l_classes(&self) -> usize {
        match &self.classification {
            Some(_) => self.lambda_orbit.len(),
            None => self.classify_current(|c| {
                let mut seen: Vec<u32> = c.lambda_of.clone();
                seen.sort_unstable();
                seen.dedup();
                seen.len()
            }),
        }
    }

    /// Number of distinct R-class labels among discovered elements.
    pub fn current_number_of_r_classes(&self) -> usize {
        match &self.classification {
            Some(_) => self.rho_orbit.len(),
            None => self.classify_current(|c| {
                let mut seen: Vec<u32> = c.rho_of.clone();
                seen.sort_unstable();
                seen.dedup();
                seen.len()
            }),
        }
    }

    /// Number of idempotents among discovered elements.
    pub fn current_number_of_idempotents(&self) -> usize {
        self.elements
            .iter()
            .filter(|x| &x.compose(x) == *x)
            .count()
    }

    /// Number of regular elements among discovered elements.
    pub fn current_number_of_regular_elements(&self) -> usize {
        match &self.classification {
            Some(c) => c.d_classes.iter().filter(|d| d.regular).map(|d| d.size).sum(),
            None => self.classify_current(|c| {
                c.d_classes.iter().filter(|d| d.regular).map(|d| d.size).sum()
            }),
        }
    }

    /// Classification of the *discovered* prefix; labels that have not
    /// entered the orbits yet are extended on the fly, so the counts are
    /// a snapshot, not final answers.
    fn classify_current<R>(&self, f: impl FnOnce(&Classification<T>) -> R) -> R {
        // Clone the orbits so unseen labels can be positioned without
        // mutating engine state.
        let snapshot = Self {
            generators: self.generators.clone(),
            lambda_orbit: {
                let mut o: LambdaOrbit<T> =
                    Action::new(ActionSide::Right, self.generators.clone(), act_lambda::<T>);
                for x in self.elements.iter() {
                    o.add_seed(x.lambda());
                }
                o
            },
            rho_orbit: {
                let mut o: RhoOrbit<T> =
                    Action::new(ActionSide::Left, self.generators.clone(), act_rho::<T>);
                for x in self.elements.iter() {
                    o.add_seed(x.rho());
                }
                o
            },
            elements: self.elements.clone(),
            frontier: self.frontier,
            batch_size: self.batch_size,
            state: RunState::NotStarted,
            classification: None,
        };
        let classification = snapshot.classify();
        f(&classification)
    }
}

impl<T: GreensPoints + ElementWithOne> fmt::Display for Konieczny<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} Konieczny with {} generators + {} elements>",
            if self.finished() {
                "finished"
            } else {
                "partially enumerated"
            },
            self.generators.len(),
            self.elements.len()
        )
    }
}
