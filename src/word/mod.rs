//! # Words and Word Orders
//!
//! The vocabulary of the whole crate: a finite ordered alphabet of letters,
//! words as short sequences of letter indices, and the three reduction
//! orders used for normal forms and rule orientation.
//!
//! ## Design Invariants
//!
//! - A letter is a `u8` index into the alphabet; alphabets therefore hold
//!   at most 256 letters and every word letter is `< alphabet size`.
//! - The empty word is representable as a value everywhere; whether it is a
//!   *legal* element is decided by the presentation's `contains_empty_word`
//!   flag, not here.
//! - All three comparators are total orders on words; shortlex and
//!   recursive-path are additionally reduction orders (no infinite
//!   descending chains), which is what makes them safe for rule
//!   orientation. Plain lex is not, and is only used for standardisation.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::cmp::Ordering;

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// Types
// ------------------------------------------------------------------------------------------------

/// The internal index form of a letter.
pub type Letter = u8;

/// A word: a finite sequence of letter indices.
pub type Word = Vec<Letter>;

/// Errors raised by alphabet construction and word conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordError {
    /// An alphabet contained the same symbol twice.
    #[error("invalid alphabet: duplicate letter {0:?}")]
    DuplicateLetter(char),

    /// An alphabet was too large for byte-indexed letters.
    #[error("invalid alphabet: {0} letters, the maximum is 256")]
    AlphabetTooLarge(usize),

    /// A string contained a symbol not in the alphabet.
    #[error("unknown letter {0:?}")]
    UnknownLetter(char),

    /// A word contained a letter index out of range for its alphabet.
    #[error("letter {letter} out of range, alphabet has {alphabet_size} letters")]
    LetterOutOfRange {
        /// The offending letter index.
        letter: Letter,
        /// The alphabet size the word was validated against.
        alphabet_size: usize,
    },
}

// ------------------------------------------------------------------------------------------------
// Orders
// ------------------------------------------------------------------------------------------------

/// A total order on words, selectable wherever normal forms or rule
/// orientation are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordOrder {
    /// Length first, then lexicographic. The default reduction order.
    #[default]
    Shortlex,

    /// Plain lexicographic.
    Lex,

    /// Recursive path order (wreath-product order on the free monoid).
    Recursive,
}

impl WordOrder {
    /// Compares `u` and `v` under this order.
    pub fn compare(self, u: &[Letter], v: &[Letter]) -> Ordering {
        match self {
            WordOrder::Shortlex => shortlex_cmp(u, v),
            WordOrder::Lex => lex_cmp(u, v),
            WordOrder::Recursive => recursive_path_cmp(u, v),
        }
    }
}

/// Shortlex: length first, ties broken lexicographically.
pub fn shortlex_cmp(u: &[Letter], v: &[Letter]) -> Ordering {
    u.len().cmp(&v.len()).then_with(|| u.cmp(v))
}

/// Plain lexicographic order (a proper prefix precedes its extensions).
pub fn lex_cmp(u: &[Letter], v: &[Letter]) -> Ordering {
    u.cmp(v)
}

/// Recursive path order on words.
///
/// Scans both words from the right, discarding the smaller of the two
/// trailing letters and remembering which side last gave way. Under this
/// order `a^k < b` for every `k` when `a < b`, so it is a reduction order
/// even though it is not length-compatible.
pub fn recursive_path_cmp(u: &[Letter], v: &[Letter]) -> Ordering {
    if u == v {
        return Ordering::Equal;
    }
    let mut i = u.len();
    let mut j = v.len();
    // Tracks whether v (true) or u (false) supplied the last discarded letter.
    let mut last_from_v = false;
    loop {
        if i == 0 {
            return if j == 0 && !last_from_v {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if j == 0 {
            return Ordering::Greater;
        }
        match u[i - 1].cmp(&v[j - 1]) {
            Ordering::Equal => {
                i -= 1;
                j -= 1;
            }
            Ordering::Less => {
                i -= 1;
                last_from_v = false;
            }
            Ordering::Greater => {
                j -= 1;
                last_from_v = true;
            }
        }
    }
}

/// Whether `letter` indexes into an alphabet of `alphabet_size` letters.
pub(crate) fn validate_letters(word: &[Letter], alphabet_size: usize) -> Result<(), WordError> {
    for &letter in word {
        if usize::from(letter) >= alphabet_size {
            return Err(WordError::LetterOutOfRange {
                letter,
                alphabet_size,
            });
        }
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Alphabet
// ------------------------------------------------------------------------------------------------

/// A finite ordered alphabet with cosmetic character aliases.
///
/// Internally every letter is its index `0..n`; the character form exists
/// only to convert human-readable words to and from index form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// An alphabet whose letters are aliased by the characters of `symbols`.
    ///
    /// Fails with [`WordError::DuplicateLetter`] if a character repeats and
    /// with [`WordError::AlphabetTooLarge`] beyond 256 symbols.
    pub fn new(symbols: &str) -> Result<Self, WordError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.len() > 256 {
            return Err(WordError::AlphabetTooLarge(symbols.len()));
        }
        for (i, &c) in symbols.iter().enumerate() {
            if symbols[..i].contains(&c) {
                return Err(WordError::DuplicateLetter(c));
            }
        }
        Ok(Self { symbols })
    }

    /// The number of letters.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the alphabet is empty. An empty alphabet is legal.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The index of `symbol`, if present.
    pub fn index_of(&self, symbol: char) -> Option<Letter> {
        self.symbols
            .iter()
            .position(|&c| c == symbol)
            .map(|i| i as Letter)
    }

    /// Converts a human-readable string into index form.
    pub fn word(&self, text: &str) -> Result<Word, WordError> {
        text.chars()
            .map(|c| self.index_of(c).ok_or(WordError::UnknownLetter(c)))
            .collect()
    }

    /// Converts a word in index form back to its character aliases.
    ///
    /// Letters out of range render as `?`.
    pub fn string_of(&self, word: &[Letter]) -> String {
        word.iter()
            .map(|&l| self.symbols.get(usize::from(l)).copied().unwrap_or('?'))
            .collect()
    }
}
