//! Matrix kernels over the common semirings.
//!
//! Entries are `i64` with two sentinels: [`NEGATIVE_INFINITY`] and
//! [`POSITIVE_INFINITY`], absorbed by the tropical operations. A
//! [`Semiring`] value carries the operations (and, for the truncated
//! semirings, the threshold), so one [`Matrix`] type covers integer,
//! max-plus, min-plus, and truncated tropical matrices.

use std::hash::Hash;

use super::{Element, ElementWithOne};

/// The additive identity of the max-plus semiring.
pub const NEGATIVE_INFINITY: i64 = i64::MIN;

/// The additive identity of the min-plus semiring.
pub const POSITIVE_INFINITY: i64 = i64::MAX;

// ------------------------------------------------------------------------------------------------
// Semirings
// ------------------------------------------------------------------------------------------------

/// A semiring structure on `i64` entries.
pub trait Semiring: Clone + Eq + Hash + std::fmt::Debug {
    /// The additive identity.
    fn zero(&self) -> i64;

    /// The multiplicative identity.
    fn one(&self) -> i64;

    /// Semiring addition.
    fn plus(&self, a: i64, b: i64) -> i64;

    /// Semiring multiplication.
    fn times(&self, a: i64, b: i64) -> i64;
}

/// The max-plus (tropical) semiring: `(max, +)` with `-∞` as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaxPlus;

impl Semiring for MaxPlus {
    fn zero(&self) -> i64 {
        NEGATIVE_INFINITY
    }

    fn one(&self) -> i64 {
        0
    }

    fn plus(&self, a: i64, b: i64) -> i64 {
        a.max(b)
    }

    fn times(&self, a: i64, b: i64) -> i64 {
        if a == NEGATIVE_INFINITY || b == NEGATIVE_INFINITY {
            NEGATIVE_INFINITY
        } else {
            a + b
        }
    }
}

/// The min-plus semiring: `(min, +)` with `+∞` as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MinPlus;

impl Semiring for MinPlus {
    fn zero(&self) -> i64 {
        POSITIVE_INFINITY
    }

    fn one(&self) -> i64 {
        0
    }

    fn plus(&self, a: i64, b: i64) -> i64 {
        a.min(b)
    }

    fn times(&self, a: i64, b: i64) -> i64 {
        if a == POSITIVE_INFINITY || b == POSITIVE_INFINITY {
            POSITIVE_INFINITY
        } else {
            a + b
        }
    }
}

/// Max-plus truncated at a threshold: finite entries live in `0..=t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxPlusTrunc(pub i64);

impl Semiring for MaxPlusTrunc {
    fn zero(&self) -> i64 {
        NEGATIVE_INFINITY
    }

    fn one(&self) -> i64 {
        0
    }

    fn plus(&self, a: i64, b: i64) -> i64 {
        a.max(b)
    }

    fn times(&self, a: i64, b: i64) -> i64 {
        if a == NEGATIVE_INFINITY || b == NEGATIVE_INFINITY {
            NEGATIVE_INFINITY
        } else {
            (a + b).min(self.0)
        }
    }
}

/// Min-plus truncated at a threshold: finite entries live in `0..=t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinPlusTrunc(pub i64);

impl Semiring for MinPlusTrunc {
    fn zero(&self) -> i64 {
        POSITIVE_INFINITY
    }

    fn one(&self) -> i64 {
        0
    }

    fn plus(&self, a: i64, b: i64) -> i64 {
        a.min(b)
    }

    fn times(&self, a: i64, b: i64) -> i64 {
        if a == POSITIVE_INFINITY || b == POSITIVE_INFINITY {
            POSITIVE_INFINITY
        } else {
            (a + b).min(self.0)
        }
    }
}

/// The ring of integers viewed as a semiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntegerRing;

impl Semiring for IntegerRing {
    fn zero(&self) -> i64 {
        0
    }

    fn one(&self) -> i64 {
        1
    }

    fn plus(&self, a: i64, b: i64) -> i64 {
        a + b
    }

    fn times(&self, a: i64, b: i64) -> i64 {
        a * b
    }
}

// ------------------------------------------------------------------------------------------------
// Matrices
// ------------------------------------------------------------------------------------------------

/// A square matrix over a [`Semiring`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix<S: Semiring> {
    semiring: S,
    dim: usize,
    entries: Vec<i64>,
}

/// Integer matrices.
pub type IntMat = Matrix<IntegerRing>;

impl<S: Semiring> Matrix<S> {
    /// A matrix from a row-major entry list of length `dim * dim`.
    pub fn new(semiring: S, dim: usize, entries: Vec<i64>) -> Self {
        assert_eq!(entries.len(), dim * dim);
        Self {
            semiring,
            dim,
            entries,
        }
    }

    /// Entry `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.entries[i * self.dim + j]
    }

    /// The semiring this matrix computes over.
    pub fn semiring(&self) -> &S {
        &self.semiring
    }

    /// The identity matrix over the same semiring.
    pub fn identity(&self) -> Self {
        let mut entries = vec![self.semiring.zero(); self.dim * self.dim];
        for i in 0..self.dim {
            entries[i * self.dim + i] = self.semiring.one();
        }
        Self {
            semiring: self.semiring.clone(),
            dim: self.dim,
            entries,
        }
    }
}

impl<S: Semiring> Element for Matrix<S> {
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dim, other.dim);
        debug_assert_eq!(self.semiring, other.semiring);
        let n = self.dim;
        let s = &self.semiring;
        let mut entries = vec![s.zero(); n * n];
        for i in 0..n {
            for j in 0..n {
                let mut acc = s.zero();
                for k in 0..n {
                    acc = s.plus(acc, s.times(self.get(i, k), other.get(k, j)));
                }
                entries[i * n + j] = acc;
            }
        }
        Self {
            semiring: self.semiring.clone(),
            dim: n,
            entries,
        }
    }

    fn degree(&self) -> usize {
        self.dim
    }

    fn complexity(&self) -> usize {
        self.dim * self.dim * self.dim
    }
}

impl<S: Semiring + Default> ElementWithOne for Matrix<S> {
    fn one_of_degree(degree: usize) -> Self {
        let semiring = S::default();
        let mut entries = vec![semiring.zero(); degree * degree];
        for i in 0..degree {
            entries[i * degree + i] = semiring.one();
        }
        Self {
            semiring,
            dim: degree,
            entries,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Projective max-plus matrices
// ------------------------------------------------------------------------------------------------

/// A max-plus matrix up to scalar (tropical) multiples: entries are
/// normalised so the largest finite entry is 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjMaxPlusMat(Matrix<MaxPlus>);

impl ProjMaxPlusMat {
    /// A projective matrix from a row-major entry list.
    pub fn new(dim: usize, entries: Vec<i64>) -> Self {
        Self(Matrix::new(MaxPlus, dim, entries)).normalised()
    }

    fn normalised(self) -> Self {
        let max = self
            .0
            .entries
            .iter()
            .copied()
            .filter(|&e| e != NEGATIVE_INFINITY)
            .max();
        match max {
            None | Some(0) => self,
            Some(max) => {
                let entries = self
                    .0
                    .entries
                    .iter()
                    .map(|&e| {
                        if e == NEGATIVE_INFINITY {
                            e
                        } else {
                            e - max
                        }
                    })
                    .collect();
                Self(Matrix::new(MaxPlus, self.0.dim, entries))
            }
        }
    }

    /// Entry `(i, j)` of the normalised representative.
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.0.get(i, j)
    }
}

impl Element for ProjMaxPlusMat {
    fn compose(&self, other: &Self) -> Self {
        Self(self.0.compose(&other.0)).normalised()
    }

    fn degree(&self) -> usize {
        self.0.degree()
    }

    fn complexity(&self) -> usize {
        self.0.complexity()
    }
}

impl ElementWithOne for ProjMaxPlusMat {
    fn one_of_degree(degree: usize) -> Self {
        Self(Matrix::<MaxPlus>::one_of_degree(degree))
    }
}
