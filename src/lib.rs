//! # fpsemi
//!
//! A library for computing with finitely generated and finitely presented
//! semigroups, monoids, and their congruences.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      Congruence facade                        │
//! │  ┌─────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ ToddCoxeter │  │ KnuthBendix  │  │ FroidurePin          │  │
//! │  │ word graph  │  │ rewriter +   │  │ element enumeration  │  │
//! │  │ + coinc.    │  │ completion   │  │ + Cayley graphs      │  │
//! │  └──────┬──────┘  └──────┬───────┘  └──────────┬───────────┘  │
//! │         │   bridges      │    bridges          │              │
//! │         └────────────────┴─────────────────────┘              │
//! │                                                               │
//! │  Konieczny: Green's D/L/R/H classification via two orbits     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`word`] | letters, words, shortlex / lex / recursive-path orders |
//! | [`presentation`] | presentations, validation helpers, examples catalogue |
//! | [`word_graph`] | node-indexed constant-out-degree multigraph |
//! | [`action`] | orbits of generator sets on point types |
//! | [`rewriter`] | terminating rule sets with two reduction back-ends |
//! | [`knuth_bendix`] | Knuth–Bendix completion engine |
//! | [`froidure_pin`] | Froidure–Pin element enumeration engine |
//! | [`element`] | element kernels: transformations, partial perms, matrices |
//! | [`todd_coxeter`] | Todd–Coxeter coset enumeration engine |
//! | [`konieczny`] | Green's relations (D/L/R/H classes) engine |
//! | [`congruence`] | facade dispatching queries to the best engine; bridges |
//! | [`runner`] | cooperative run control, tri-valued answers, reporting |
//!
//! ## Quick Start
//!
//! ```
//! use fpsemi::CongruenceKind;
//! use fpsemi::presentation::Presentation;
//! use fpsemi::runner::Cardinality;
//! use fpsemi::todd_coxeter::ToddCoxeter;
//!
//! // The monoid with presentation <a, b | aaa = a, bbbb = b, ababab = aa>.
//! let mut p = Presentation::new(2);
//! p.add_rule(&[0, 0, 0], &[0]).unwrap();
//! p.add_rule(&[1, 1, 1, 1], &[1]).unwrap();
//! p.add_rule(&[0, 1, 0, 1, 0, 1], &[0, 0]).unwrap();
//!
//! let mut tc = ToddCoxeter::new(CongruenceKind::TwoSided, p).unwrap();
//! assert_eq!(tc.number_of_classes(), Cardinality::Finite(27));
//! ```

use std::fmt;

pub mod action;
pub mod congruence;
pub mod element;
pub mod froidure_pin;
pub mod knuth_bendix;
pub mod konieczny;
pub mod presentation;
pub mod rewriter;
pub mod runner;
pub mod todd_coxeter;
pub mod word;
pub mod word_graph;

/// The kind of congruence an engine computes: the closure of its
/// generating pairs under two-sided, left, or right compatibility with
/// concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongruenceKind {
    /// Compatible with multiplication on both sides.
    #[default]
    TwoSided,

    /// Compatible with multiplication on the left only.
    Left,

    /// Compatible with multiplication on the right only.
    Right,
}

impl fmt::Display for CongruenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongruenceKind::TwoSided => write!(f, "2-sided"),
            CongruenceKind::Left => write!(f, "left"),
            CongruenceKind::Right => write!(f, "right"),
        }
    }
}
