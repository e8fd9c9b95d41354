//! # Presentation Module
//!
//! A [`Presentation`] is the value type every engine is seeded from: an
//! alphabet size, a list of rules (unordered pairs of words), and a flag
//! recording whether the presented structure contains the empty word.
//!
//! ## Design Invariants
//!
//! - Every word in every rule uses only letters `< alphabet_size`.
//! - The empty word appears in a rule only if `contains_empty_word` is set.
//! - Validation is eager: invalid alphabets, words, and rules are rejected
//!   at the interface boundary, never surfaced mid-run.
//! - A presentation is a plain value; after hand-off an engine owns its own
//!   copy and later mutation of the original has no effect on the engine.
//!
//! ## Helpers
//!
//! User-side helpers (`add_identity_rules`, `add_inverse_rules`,
//! `remove_duplicate_rules`, `sort_rules`, …) are free functions mutating a
//! presentation in place, so they compose without method-chaining noise.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

pub mod examples;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;

use thiserror::Error;

use crate::word::{self, Alphabet, Letter, Word, WordError, shortlex_cmp};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised while building or validating a [`Presentation`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresentationError {
    /// A word or alphabet was malformed.
    #[error("word error: {0}")]
    Word(#[from] WordError),

    /// A rule side was the empty word but the presentation forbids it.
    #[error("invalid rule: empty word in a presentation without the empty word")]
    EmptyWordForbidden,

    /// A degree or size argument outside the domain of a catalogue entry.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ------------------------------------------------------------------------------------------------
// Presentation
// ------------------------------------------------------------------------------------------------

/// A finite presentation: alphabet, rules, and the empty-word flag.
///
/// Rules are stored as a flat list of words of even length; the pair
/// `(rules[2i], rules[2i + 1])` is the `i`-th rule. Rules are unordered as
/// far as the presented structure is concerned; engines orient them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Presentation {
    alphabet_size: usize,
    rules: Vec<Word>,
    contains_empty_word: bool,
}

impl Presentation {
    /// A presentation over `alphabet_size` letters with no rules, not
    /// containing the empty word.
    pub fn new(alphabet_size: usize) -> Self {
        Self {
            alphabet_size,
            rules: Vec::new(),
            contains_empty_word: false,
        }
    }

    /// The number of letters in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Sets whether the presented structure contains the empty word.
    pub fn set_contains_empty_word(&mut self, value: bool) -> &mut Self {
        self.contains_empty_word = value;
        self
    }

    /// Whether the presented structure contains the empty word.
    pub fn contains_empty_word(&self) -> bool {
        self.contains_empty_word
    }

    /// Adds the rule `lhs = rhs`.
    ///
    /// Both sides are validated against the alphabet; empty sides are only
    /// accepted when the presentation contains the empty word.
    pub fn add_rule(&mut self, lhs: &[Letter], rhs: &[Letter]) -> Result<(), PresentationError> {
        self.validate_word(lhs)?;
        self.validate_word(rhs)?;
        self.rules.push(lhs.to_vec());
        self.rules.push(rhs.to_vec());
        Ok(())
    }

    /// Number of rules.
    pub fn number_of_rules(&self) -> usize {
        self.rules.len() / 2
    }

    /// Iterates over the rules as `(lhs, rhs)` pairs.
    pub fn rules(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.rules.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Validates a single word against this presentation.
    pub fn validate_word(&self, word: &[Letter]) -> Result<(), PresentationError> {
        word::validate_letters(word, self.alphabet_size)?;
        if word.is_empty() && !self.contains_empty_word {
            return Err(PresentationError::EmptyWordForbidden);
        }
        Ok(())
    }

    /// Validates the whole presentation (used after bulk mutation).
    pub fn validate(&self) -> Result<(), PresentationError> {
        for (lhs, rhs) in self.rules() {
            self.validate_word(lhs)?;
            self.validate_word(rhs)?;
        }
        Ok(())
    }

    /// The length of the longest rule side, or 0 when there are no rules.
    pub fn max_rule_length(&self) -> usize {
        self.rules.iter().map(Word::len).max().unwrap_or(0)
    }

    /// One-line summary used by engine `Display` impls.
    pub fn summary(&self) -> String {
        format!(
            "{} presentation with {} letters + {} rules",
            if self.contains_empty_word {
                "monoid"
            } else {
                "semigroup"
            },
            self.alphabet_size,
            self.number_of_rules()
        )
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.summary())
    }
}

// ------------------------------------------------------------------------------------------------
// String-built presentations
// ------------------------------------------------------------------------------------------------

/// Builds a presentation from character-aliased rules.
///
/// ```
/// use fpsemi::presentation::from_symbols;
///
/// let p = from_symbols("ab", &[("aaa", "a"), ("bbbb", "b")], false).unwrap();
/// assert_eq!(p.number_of_rules(), 2);
/// ```
pub fn from_symbols(
    symbols: &str,
    rules: &[(&str, &str)],
    contains_empty_word: bool,
) -> Result<Presentation, PresentationError> {
    let alphabet = Alphabet::new(symbols)?;
    let mut p = Presentation::new(alphabet.len());
    p.set_contains_empty_word(contains_empty_word);
    for &(lhs, rhs) in rules {
        let lhs = alphabet.word(lhs)?;
        let rhs = alphabet.word(rhs)?;
        p.add_rule(&lhs, &rhs)?;
    }
    Ok(p)
}

// ------------------------------------------------------------------------------------------------
// User-side helpers
// ------------------------------------------------------------------------------------------------

/// Adds the rules `e·a = a` and `a·e = a` for every letter `a != e`,
/// declaring `e` an identity.
pub fn add_identity_rules(p: &mut Presentation, e: Letter) -> Result<(), PresentationError> {
    for a in 0..p.alphabet_size() as u8 {
        if a != e {
            p.add_rule(&[e, a], &[a])?;
            p.add_rule(&[a, e], &[a])?;
        }
    }
    p.add_rule(&[e, e], &[e])?;
    Ok(())
}

/// Adds the rules `a·a⁻¹ = ε` for every letter, where `inverses[a]` is the
/// inverse of letter `a`.
///
/// The presentation must contain the empty word, `inverses` must be a
/// permutation of the alphabet, and the permutation must be an involution.
pub fn add_inverse_rules(p: &mut Presentation, inverses: &[Letter]) -> Result<(), PresentationError> {
    if inverses.len() != p.alphabet_size() {
        return Err(PresentationError::InvalidArgument(format!(
            "expected {} inverses, got {}",
            p.alphabet_size(),
            inverses.len()
        )));
    }
    if !p.contains_empty_word() {
        return Err(PresentationError::EmptyWordForbidden);
    }
    let mut seen = vec![false; inverses.len()];
    for (a, &b) in inverses.iter().enumerate() {
        word::validate_letters(&[b], p.alphabet_size())?;
        if seen[usize::from(b)] || usize::from(inverses[usize::from(b)]) != a {
            return Err(PresentationError::InvalidArgument(
                "inverses must form an involution of the alphabet".to_string(),
            ));
        }
        seen[usize::from(b)] = true;
    }
    for (a, &b) in inverses.iter().enumerate() {
        p.add_rule(&[a as Letter, b], &[])?;
    }
    Ok(())
}

/// Removes rules appearing twice (in either orientation) and trivial rules
/// `u = u`.
pub fn remove_duplicate_rules(p: &mut Presentation) {
    let mut kept: Vec<Word> = Vec::with_capacity(p.rules.len());
    'outer: for pair in p.rules.chunks_exact(2) {
        if pair[0] == pair[1] {
            continue;
        }
        for old in kept.chunks_exact(2) {
            if (old[0] == pair[0] && old[1] == pair[1]) || (old[0] == pair[1] && old[1] == pair[0])
            {
                continue 'outer;
            }
        }
        kept.push(pair[0].clone());
        kept.push(pair[1].clone());
    }
    p.rules = kept;
}

/// Orients every rule so its shortlex-larger side comes first.
pub fn sort_each_rule(p: &mut Presentation) {
    for pair in p.rules.chunks_exact_mut(2) {
        if shortlex_cmp(&pair[0], &pair[1]) == std::cmp::Ordering::Less {
            pair.swap(0, 1);
        }
    }
}

/// Sorts the rule list by shortlex on `(lhs, rhs)` pairs.
pub fn sort_rules(p: &mut Presentation) {
    let mut pairs: Vec<(Word, Word)> = p.rules().map(|(u, v)| (u.clone(), v.clone())).collect();
    pairs.sort_by(|a, b| shortlex_cmp(&a.0, &b.0).then_with(|| shortlex_cmp(&a.1, &b.1)));
    p.rules.clear();
    for (lhs, rhs) in pairs {
        p.rules.push(lhs);
        p.rules.push(rhs);
    }
}

/// The total length of all rule sides; a crude size measure used in
/// progress reports.
pub fn length(p: &Presentation) -> usize {
    p.rules.iter().map(Word::len).sum()
}

// ------------------------------------------------------------------------------------------------
// Obvious-infinity detection
// ------------------------------------------------------------------------------------------------

/// Abelianisation check: true when the presented structure (with the
/// extra word pairs adjoined as relations) is provably infinite.
///
/// Each relation `u = v` abelianises to an integer vector of per-letter
/// occurrence differences; if those vectors span a lattice of rank less
/// than the alphabet size, the abelian image is infinite and so is the
/// structure. Sound but not complete: `false` means "not obviously
/// infinite". The check is valid for one-sided congruences too, since the
/// class set of a one-sided congruence still maps onto the abelian
/// quotient.
pub fn obviously_infinite(p: &Presentation, extra_pairs: &[(Word, Word)]) -> bool {
    let n = p.alphabet_size();
    if n == 0 {
        return false;
    }
    let mut rows: Vec<Vec<i128>> = Vec::new();
    let mut add_row = |u: &Word, v: &Word| {
        let mut row = vec![0i128; n];
        for &a in u {
            row[usize::from(a)] += 1;
        }
        for &a in v {
            row[usize::from(a)] -= 1;
        }
        rows.push(row);
    };
    for (u, v) in p.rules() {
        add_row(u, v);
    }
    for (u, v) in extra_pairs {
        add_row(u, v);
    }
    integer_rank(rows, n) < n
}

/// Rank of an integer matrix by fraction-free Gaussian elimination.
fn integer_rank(mut rows: Vec<Vec<i128>>, cols: usize) -> usize {
    let mut rank = 0;
    for col in 0..cols {
        let Some(pivot_row) = (rank..rows.len()).find(|&r| rows[r][col] != 0) else {
            continue;
        };
        rows.swap(rank, pivot_row);
        for r in rank + 1..rows.len() {
            if rows[r][col] == 0 {
                continue;
            }
            let (p, q) = (rows[rank][col], rows[r][col]);
            let g = gcd(p.unsigned_abs(), q.unsigned_abs()) as i128;
            let (p, q) = (p / g, q / g);
            for c in col..cols {
                rows[r][c] = rows[r][c] * p - rows[rank][c] * q;
            }
        }
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }
    rank
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
