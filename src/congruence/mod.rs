//! # Congruence Facade
//!
//! A single entry point for congruence questions that dispatches to
//! whichever engine is best positioned to answer. The facade holds a
//! tagged engine state:
//!
//! - `Uninitialised` — no engine constructed yet;
//! - `Running` — candidate engines (Todd–Coxeter always; Knuth–Bendix
//!   for two-sided congruences) advanced round-robin in cooperative
//!   time slices;
//! - `Finished` — the first engine to complete answers all further
//!   queries.
//!
//! Froidure–Pin results participate through the bridges in
//! [`bridge`]: a finite enumeration converts into a seeded Todd–Coxeter
//! or Knuth–Bendix instance, and a finished Todd–Coxeter converts into a
//! Froidure–Pin over its class elements.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


pub mod bridge;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::CongruenceKind;
use crate::knuth_bendix::{KnuthBendix, KnuthBendixError};
use crate::presentation::{self, Presentation, PresentationError};
use crate::runner::{Cardinality, Tril};
use crate::todd_coxeter::{ToddCoxeter, ToddCoxeterError};
use crate::word::{Letter, Word};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`Congruence`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CongruenceError {
    /// Error validating the presentation or an input word.
    #[error("presentation error: {0}")]
    Presentation(#[from] PresentationError),

    /// Error from the Todd–Coxeter candidate.
    #[error("Todd-Coxeter error: {0}")]
    ToddCoxeter(#[from] ToddCoxeterError),

    /// Error from the Knuth–Bendix candidate.
    #[error("Knuth-Bendix error: {0}")]
    KnuthBendix(#[from] KnuthBendixError),

    /// A query that needs a finished engine was posed too early.
    #[error("engine not ready: {0}")]
    EngineNotReady(String),
}

// ------------------------------------------------------------------------------------------------
// Facade
// ------------------------------------------------------------------------------------------------

enum EngineState {
    Uninitialised,
    Running {
        tc: ToddCoxeter,
        kb: Option<KnuthBendix>,
    },
    Finished(Winner),
}

enum Winner {
    ToddCoxeter(ToddCoxeter),
    KnuthBendix(KnuthBendix),
}

/// A congruence over a finitely presented structure, answered by the
/// best-positioned engine.
pub struct Congruence {
    kind: CongruenceKind,
    presentation: Presentation,
    pairs: Vec<(Word, Word)>,
    state: EngineState,
    /// Cooperative slice granted to each candidate per round.
    slice: Duration,
}

impl Congruence {
    /// A congruence of `kind` over `presentation`.
    pub fn new(kind: CongruenceKind, presentation: Presentation) -> Result<Self, CongruenceError> {
        presentation.validate()?;
        Ok(Self {
            kind,
            presentation,
            pairs: Vec::new(),
            state: EngineState::Uninitialised,
            slice: Duration::from_millis(20),
        })
    }

    /// The congruence kind.
    pub fn kind(&self) -> CongruenceKind {
        self.kind
    }

    /// The generating pairs declared so far.
    pub fn generating_pairs(&self) -> &[(Word, Word)] {
        &self.pairs
    }

    /// Declares `u = v`; only legal before the first run.
    pub fn add_generating_pair(&mut self, u: &[Letter], v: &[Letter]) -> Result<(), CongruenceError> {
        if !matches!(self.state, EngineState::Uninitialised) {
            return Err(CongruenceError::EngineNotReady(
                "generating pairs cannot be added after run".to_string(),
            ));
        }
        self.presentation.validate_word(u)?;
        self.presentation.validate_word(v)?;
        self.pairs.push((u.to_vec(), v.to_vec()));
        Ok(())
    }

    fn init(&mut self) -> Result<(), CongruenceError> {
        if !matches!(self.state, EngineState::Uninitialised) {
            return Ok(());
        }
        let mut tc = ToddCoxeter::new(self.kind, self.presentation.clone())?;
        for (u, v) in &self.pairs {
            tc.add_generating_pair(u, v)?;
        }
        let kb = if self.kind == CongruenceKind::TwoSided {
            let mut kb = KnuthBendix::new(self.kind, self.presentation.clone())?;
            for (u, v) in &self.pairs {
                kb.add_generating_pair(u, v)?;
            }
            Some(kb)
        } else {
            None
        };
        self.state = EngineState::Running { tc, kb };
        Ok(())
    }

    /// Whether some candidate engine has finished.
    pub fn finished(&self) -> bool {
        matches!(self.state, EngineState::Finished(_))
    }

    /// Runs the candidates round-robin until one finishes.
    pub fn run(&mut self) -> Result<(), CongruenceError> {
        loop {
            self.run_for(self.slice)?;
            if self.finished() {
                return Ok(());
            }
        }
    }

    /// Runs each candidate for one slice; returns after at most one round
    /// past `duration`.
    pub fn run_for(&mut self, duration: Duration) -> Result<(), CongruenceError> {
        self.init()?;
        let deadline = std::time::Instant::now() + duration;
        loop {
            let mut tc_won = false;
            let mut kb_won = false;
            let mut drop_kb = false;
            {
                let EngineState::Running { tc, kb } = &mut self.state else {
                    return Ok(());
                };
                tc.run_for(self.slice);
                if tc.finished() {
                    tc_won = true;
                } else if let Some(kb_engine) = kb {
                    // A Knuth-Bendix limit eliminates that candidate but
                    // is not an error for the facade.
                    match kb_engine.run_for(self.slice) {
                        Ok(()) => kb_won = kb_engine.finished(),
                        Err(KnuthBendixError::ResourceLimit { .. }) => drop_kb = true,
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            if drop_kb {
                debug!("Knuth-Bendix candidate eliminated by resource limit");
                if let EngineState::Running { kb, .. } = &mut self.state {
                    *kb = None;
                }
            }
            if tc_won || kb_won {
                let EngineState::Running { tc, kb } =
                    std::mem::replace(&mut self.state, EngineState::Uninitialised)
                else {
                    unreachable!();
                };
                self.state = if tc_won {
                    debug!("Todd-Coxeter finished first");
                    EngineState::Finished(Winner::ToddCoxeter(tc))
                } else {
                    debug!("Knuth-Bendix finished first");
                    EngineState::Finished(Winner::KnuthBendix(
                        kb.expect("only a live Knuth-Bendix can win"),
                    ))
                };
                return Ok(());
            }
            if std::time::Instant::now() >= deadline {
                return Ok(());
            }
        }
    }

    /// The number of congruence classes.
    pub fn number_of_classes(&mut self) -> Result<Cardinality, CongruenceError> {
        if presentation::obviously_infinite(&self.presentation, &self.pairs) {
            return Ok(Cardinality::Infinite);
        }
        self.run()?;
        match &mut self.state {
            EngineState::Finished(Winner::ToddCoxeter(tc)) => Ok(tc.number_of_classes()),
            EngineState::Finished(Winner::KnuthBendix(kb)) => Ok(kb.number_of_classes()?),
            _ => unreachable!("run only returns with a winner"),
        }
    }

    /// Whether `u` and `v` are congruent (runs until decidable).
    pub fn contains(&mut self, u: &[Letter], v: &[Letter]) -> Result<bool, CongruenceError> {
        self.run()?;
        match &mut self.state {
            EngineState::Finished(Winner::ToddCoxeter(tc)) => Ok(tc.contains(u, v)?),
            EngineState::Finished(Winner::KnuthBendix(kb)) => Ok(kb.contains(u, v)?),
            _ => unreachable!("run only returns with a winner"),
        }
    }

    /// Tri-valued congruence test; never finishes a run.
    pub fn currently_contains(&self, u: &[Letter], v: &[Letter]) -> Result<Tril, CongruenceError> {
        match &self.state {
            EngineState::Uninitialised => {
                self.presentation.validate_word(u)?;
                self.presentation.validate_word(v)?;
                Ok(if u == v { Tril::True } else { Tril::Unknown })
            }
            EngineState::Running { tc, kb } => {
                let from_tc = tc.currently_contains(u, v)?;
                if from_tc != Tril::Unknown {
                    return Ok(from_tc);
                }
                match kb {
                    Some(kb) => Ok(kb.currently_contains(u, v)?),
                    None => Ok(Tril::Unknown),
                }
            }
            EngineState::Finished(Winner::ToddCoxeter(tc)) => Ok(tc.currently_contains(u, v)?),
            EngineState::Finished(Winner::KnuthBendix(kb)) => Ok(kb.currently_contains(u, v)?),
        }
    }

    /// A canonical form of `word` under the congruence (runs first).
    pub fn reduce(&mut self, word: &[Letter]) -> Result<Word, CongruenceError> {
        self.run()?;
        match &mut self.state {
            EngineState::Finished(Winner::KnuthBendix(kb)) => Ok(kb.reduce(word)?),
            EngineState::Finished(Winner::ToddCoxeter(tc)) => {
                let index = tc.index_of(word)?;
                Ok(tc.word_of(index)?)
            }
            _ => unreachable!("run only returns with a winner"),
        }
    }

    /// The normal forms of all classes (requires a finite congruence).
    pub fn normal_forms(&mut self) -> Result<Vec<Word>, CongruenceError> {
        if !matches!(self.number_of_classes()?, Cardinality::Finite(_)) {
            return Err(CongruenceError::EngineNotReady(
                "the congruence does not have finitely many classes".to_string(),
            ));
        }
        match &mut self.state {
            EngineState::Finished(Winner::ToddCoxeter(tc)) => Ok(tc.normal_forms()?),
            EngineState::Finished(Winner::KnuthBendix(kb)) => Ok(kb.normal_forms().collect()),
            _ => unreachable!("run only returns with a winner"),
        }
    }

    /// Groups `words` into classes, returning those with more than one
    /// member.
    pub fn non_trivial_classes(
        &mut self,
        words: impl IntoIterator<Item = Word>,
    ) -> Result<Vec<Vec<Word>>, CongruenceError> {
        let mut by_form: std::collections::BTreeMap<Word, Vec<Word>> =
            std::collections::BTreeMap::new();
        for word in words {
            let form = self.reduce(&word)?;
            by_form.entry(form).or_default().push(word);
        }
        Ok(by_form
            .into_values()
            .filter(|class| class.len() > 1)
            .collect())
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            EngineState::Uninitialised => "uninitialised",
            EngineState::Running { .. } => "running",
            EngineState::Finished(Winner::ToddCoxeter(_)) => "finished (ToddCoxeter)",
            EngineState::Finished(Winner::KnuthBendix(_)) => "finished (KnuthBendix)",
        };
        write!(
            f,
            "<{} Congruence over {} with {} generating pairs, {}>",
            self.kind,
            self.presentation,
            self.pairs.len(),
            state
        )
    }
}
