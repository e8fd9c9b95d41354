//! # Element Kernels
//!
//! The element-kernel interface every concrete element type implements,
//! plus the kernels shipped with the crate: transformations (generic and
//! bit-packed), partial permutations, boolean matrices packed into a
//! `u64`, and matrices over the common semirings.
//!
//! ## Contract
//!
//! - [`Element::compose`] is associative, reads left to right
//!   (`a.compose(b)` means "apply `a`, then `b`"), and never mutates.
//! - Equality and hashing agree; elements are never mutated after
//!   insertion into an engine.
//! - [`Element::complexity`] is a cost hint used by Froidure–Pin to decide
//!   between composing kernels and tracing the Cayley graph.
//!
//! Konieczny additionally needs the two one-sided action values of an
//! element (its "lambda" and "rho"), provided by [`GreensPoints`].
//!
//! The 16-byte kernels are natural targets for hand-written SIMD; here
//! they compute the same functions in portable scalar code.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

pub mod bipartition;
pub mod bmat;
pub mod matrix;

pub use bipartition::Bipartition;
pub use bmat::{BMat8, BoolMat};
pub use matrix::{
    IntMat, IntegerRing, Matrix, MaxPlus, MaxPlusTrunc, MinPlus, MinPlusTrunc, ProjMaxPlusMat,
    Semiring,
};

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::hash::Hash;

// ------------------------------------------------------------------------------------------------
// Kernel traits
// ------------------------------------------------------------------------------------------------

/// The element-kernel interface: associative composition with equality,
/// hashing, and cost hints.
pub trait Element: Clone + Eq + Hash {
    /// Associative composition, left to right: apply `self`, then `other`.
    fn compose(&self, other: &Self) -> Self;

    /// The degree (number of points, matrix dimension, …).
    fn degree(&self) -> usize;

    /// Cost hint for one composition, in arbitrary units.
    fn complexity(&self) -> usize;
}

/// Element types with an identity of each degree (monoid kernels).
pub trait ElementWithOne: Element {
    /// The identity element of the given degree.
    fn one_of_degree(degree: usize) -> Self;

    /// The identity of `self`'s degree.
    fn one(&self) -> Self {
        Self::one_of_degree(self.degree())
    }
}

/// Element types with inverses (inverse-semigroup kernels).
pub trait InverseElement: ElementWithOne {
    /// The inverse of `self`.
    fn inverse(&self) -> Self;
}

/// The two one-sided action values consumed by the Konieczny engine.
///
/// `lambda` transforms under *right* multiplication and labels L-classes;
/// `rho` transforms under *left* multiplication and labels R-classes.
pub trait GreensPoints: Element {
    /// L-class label type (e.g. the image set, the row-space basis).
    type Lambda: Clone + Eq + Hash + std::fmt::Debug;

    /// R-class label type (e.g. the kernel, the column-space basis).
    type Rho: Clone + Eq + Hash + std::fmt::Debug;

    /// The L-point of `self`.
    fn lambda(&self) -> Self::Lambda;

    /// The R-point of `self`.
    fn rho(&self) -> Self::Rho;

    /// `lambda(x · self)` computed from `lambda(x)`.
    fn lambda_act(&self, lambda: &Self::Lambda) -> Self::Lambda;

    /// `rho(self · x)` computed from `rho(x)`.
    fn rho_act(&self, rho: &Self::Rho) -> Self::Rho;

    /// The rank (image size, row-space basis size, …). Constant on
    /// D-classes of regular elements.
    fn rank(&self) -> usize;
}

// ------------------------------------------------------------------------------------------------
// Transformations
// ------------------------------------------------------------------------------------------------

/// A transformation of `{0, …, n-1}` stored as its image list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transf {
    images: Vec<u8>,
}

impl Transf {
    /// A transformation from its image list; every image must be
    /// `< images.len()`.
    pub fn new(images: Vec<u8>) -> Self {
        assert!(
            images.iter().all(|&i| usize::from(i) < images.len()),
            "image out of range"
        );
        Self { images }
    }

    /// The image of `point`.
    pub fn apply(&self, point: u8) -> u8 {
        self.images[usize::from(point)]
    }

    /// The underlying image list.
    pub fn images(&self) -> &[u8] {
        &self.images
    }

    /// Whether this transformation is idempotent.
    pub fn is_idempotent(&self) -> bool {
        self.compose(self) == *self
    }
}

impl Element for Transf {
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree(), other.degree());
        Self {
            images: self
                .images
                .iter()
                .map(|&i| other.images[usize::from(i)])
                .collect(),
        }
    }

    fn degree(&self) -> usize {
        self.images.len()
    }

    fn complexity(&self) -> usize {
        self.images.len()
    }
}

impl ElementWithOne for Transf {
    fn one_of_degree(degree: usize) -> Self {
        Self {
            images: (0..degree as u8).collect(),
        }
    }
}

impl GreensPoints for Transf {
    /// Sorted image set.
    type Lambda = Vec<u8>;

    /// Kernel as canonically numbered class labels.
    type Rho = Vec<u8>;

    fn lambda(&self) -> Vec<u8> {
        let mut image: Vec<u8> = self.images.clone();
        image.sort_unstable();
        image.dedup();
        image
    }

    fn rho(&self) -> Vec<u8> {
        canonical_kernel(&self.images)
    }

    fn lambda_act(&self, lambda: &Vec<u8>) -> Vec<u8> {
        let mut image: Vec<u8> = lambda
            .iter()
            .map(|&p| self.images[usize::from(p)])
            .collect();
        image.sort_unstable();
        image.dedup();
        image
    }

    fn rho_act(&self, rho: &Vec<u8>) -> Vec<u8> {
        let pulled: Vec<u8> = self
            .images
            .iter()
            .map(|&p| rho[usize::from(p)])
            .collect();
        canonical_kernel(&pulled)
    }

    fn rank(&self) -> usize {
        self.lambda().len()
    }
}

impl fmt::Display for Transf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transf({:?})", self.images)
    }
}

/// Renumbers a label vector so classes appear in first-occurrence order.
fn canonical_kernel(labels: &[u8]) -> Vec<u8> {
    let mut mapping = [u8::MAX; 256];
    let mut next = 0u8;
    labels
        .iter()
        .map(|&l| {
            if mapping[usize::from(l)] == u8::MAX {
                mapping[usize::from(l)] = next;
                next += 1;
            }
            mapping[usize::from(l)]
        })
        .collect()
}

// ------------------------------------------------------------------------------------------------
// Bit-packed transformations of degree at most 16
// ------------------------------------------------------------------------------------------------

/// A transformation of degree at most 16, nibble-packed into a `u64`.
///
/// Nibble `i` holds the image of point `i`; nibbles at or beyond the
/// degree are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transf16 {
    data: u64,
    degree: u8,
}

impl Transf16 {
    /// A packed transformation from an image list of length at most 16.
    pub fn new(images: &[u8]) -> Self {
        assert!(images.len() <= 16, "degree at most 16");
        assert!(
            images.iter().all(|&i| usize::from(i) < images.len()),
            "image out of range"
        );
        let mut data = 0u64;
        for (i, &image) in images.iter().enumerate() {
            data |= u64::from(image) << (4 * i);
        }
        Self {
            data,
            degree: images.len() as u8,
        }
    }

    /// The image of `point`.
    pub fn apply(&self, point: u8) -> u8 {
        debug_assert!(point < self.degree);
        ((self.data >> (4 * point)) & 0xF) as u8
    }
}

impl Element for Transf16 {
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        let mut data = 0u64;
        for i in 0..self.degree {
            data |= u64::from(other.apply(self.apply(i))) << (4 * i);
        }
        Self {
            data,
            degree: self.degree,
        }
    }

    fn degree(&self) -> usize {
        usize::from(self.degree)
    }

    fn complexity(&self) -> usize {
        usize::from(self.degree)
    }
}

impl ElementWithOne for Transf16 {
    fn one_of_degree(degree: usize) -> Self {
        assert!(degree <= 16);
        let mut data = 0u64;
        for i in 0..degree as u8 {
            data |= u64::from(i) << (4 * i);
        }
        Self {
            data,
            degree: degree as u8,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Partial permutations of degree at most 16
// ------------------------------------------------------------------------------------------------

/// The byte marking an undefined point of a [`PPerm16`].
pub const PPERM_UNDEFINED: u8 = 0xFF;

/// A partial permutation of degree at most 16, byte-packed into a `u128`.
///
/// Byte `i` holds the image of point `i`, or [`PPERM_UNDEFINED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PPerm16 {
    data: u128,
    degree: u8,
}

impl PPerm16 {
    /// A packed partial permutation from an image list with
    /// [`PPERM_UNDEFINED`] for undefined points. Defined images must be
    /// distinct and `< images.len()`.
    pub fn new(images: &[u8]) -> Self {
        assert!(images.len() <= 16, "degree at most 16");
        let mut seen = [false; 16];
        for &image in images {
            if image != PPERM_UNDEFINED {
                assert!(usize::from(image) < images.len(), "image out of range");
                assert!(!seen[usize::from(image)], "images must be distinct");
                seen[usize::from(image)] = true;
            }
        }
        let mut data = 0u128;
        for (i, &image) in images.iter().enumerate() {
            data |= u128::from(image) << (8 * i);
        }
        for i in images.len()..16 {
            data |= u128::from(PPERM_UNDEFINED) << (8 * i);
        }
        Self {
            data,
            degree: images.len() as u8,
        }
    }

    /// The image of `point`, or [`PPERM_UNDEFINED`].
    pub fn apply(&self, point: u8) -> u8 {
        ((self.data >> (8 * point)) & 0xFF) as u8
    }

    /// The number of defined points.
    pub fn defined_points(&self) -> usize {
        (0..self.degree)
            .filter(|&i| self.apply(i) != PPERM_UNDEFINED)
            .count()
    }
}

impl Element for PPerm16 {
    fn compose(&self, other: &Self) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        let mut data = 0u128;
        for i in 0..16u8 {
            let mid = if i < self.degree {
                self.apply(i)
            } else {
                PPERM_UNDEFINED
            };
            let image = if mid == PPERM_UNDEFINED {
                PPERM_UNDEFINED
            } else {
                other.apply(mid)
            };
            data |= u128::from(image) << (8 * i);
        }
        Self {
            data,
            degree: self.degree,
        }
    }

    fn degree(&self) -> usize {
        usize::from(self.degree)
    }

    fn complexity(&self) -> usize {
        usize::from(self.degree)
    }
}

impl ElementWithOne for PPerm16 {
    fn one_of_degree(degree: usize) -> Self {
        assert!(degree <= 16);
        let images: Vec<u8> = (0..degree as u8).collect();
        Self::new(&images)
    }
}

impl InverseElement for PPerm16 {
    fn inverse(&self) -> Self {
        let mut images = vec![PPERM_UNDEFINED; usize::from(self.degree)];
        for i in 0..self.degree {
            let image = self.apply(i);
            if image != PPERM_UNDEFINED {
                images[usize::from(image)] = i;
            }
        }
        Self::new(&images)
    }
}
