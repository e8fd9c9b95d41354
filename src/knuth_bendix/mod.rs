//! # Knuth–Bendix Engine
//!
//! Completion of a string rewriting system presented by a
//! [`Presentation`]: repeatedly pick a pair of active rules in FIFO order,
//! form every critical pair arising from overlaps of their left-hand
//! sides, reduce both sides, and insert a new rule whenever the two
//! reductions differ. When the pair queue drains the rule set is
//! confluent and every congruence query becomes decidable by reduction.
//!
//! ## Checkpoints
//!
//! One checkpoint is the processing of one overlap pair followed by one
//! pending-rule drain. `run_for` / `run_until` poll between checkpoints;
//! a pathological single drain cannot be interrupted.
//!
//! ## Limits
//!
//! Hitting `max_pending_rules` or `max_rules` raises
//! [`KnuthBendixError::ResourceLimit`] at the checkpoint boundary and
//! leaves the engine consistent and resumable (raise the limit and call a
//! `run_*` method again). Queries that demand confluence propagate the
//! limit error; tri-valued queries still answer from the partial rule set.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::CongruenceKind;
use crate::presentation::{self, Presentation, PresentationError};
use crate::rewriter::{Rewriter, RewriterBackend, RewriterError, RuleId};
use crate::runner::{Cardinality, RunState, StopPolicy, Tril, reporting_enabled};
use crate::word::{Letter, Word, WordOrder};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`KnuthBendix`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnuthBendixError {
    /// Error validating the presentation or an input word.
    #[error("presentation error: {0}")]
    Presentation(#[from] PresentationError),

    /// Error from the underlying rewriter.
    #[error("rewriter error: {0}")]
    Rewriter(#[from] RewriterError),

    /// A mutation was attempted after the run started.
    #[error("engine not ready: {0}")]
    EngineNotReady(String),

    /// An unsupported configuration was requested.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configured limit was hit before the query could be answered.
    #[error("resource limit: {limit} {threshold} reached with {current} present")]
    ResourceLimit {
        /// Which limit fired (`"max_pending_rules"` or `"max_rules"`).
        limit: &'static str,
        /// The configured threshold.
        threshold: usize,
        /// The count observed at the checkpoint.
        current: usize,
    },
}

// ------------------------------------------------------------------------------------------------
// Configuration
// ------------------------------------------------------------------------------------------------

/// The reduction order rules are oriented by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReductionOrder {
    /// Shortlex on the presentation's letter order. The default.
    Shortlex,

    /// Recursive path order.
    Recursive,

    /// Shortlex after relabelling letters: the vector lists the alphabet
    /// from smallest to largest.
    CustomShortlex(Vec<Letter>),
}

impl Default for ReductionOrder {
    fn default() -> Self {
        ReductionOrder::Shortlex
    }
}

/// Configuration for a [`KnuthBendix`] instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnuthBendixConfig {
    /// Checkpoint limit on the pending-rule queue.
    pub max_pending_rules: usize,

    /// Checkpoint limit on the active-rule count.
    pub max_rules: usize,

    /// Reduction order used to orient rules.
    pub reduction_order: ReductionOrder,

    /// Which reduction back-end the rewriter uses.
    pub rewriter_backend: RewriterBackend,
}

impl Default for KnuthBendixConfig {
    fn default() -> Self {
        Self {
            max_pending_rules: 65_536,
            max_rules: usize::MAX,
            reduction_order: ReductionOrder::default(),
            rewriter_backend: RewriterBackend::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Engine
// ------------------------------------------------------------------------------------------------

/// Knuth–Bendix completion over a finitely presented monoid or semigroup.
#[derive(Debug)]
pub struct KnuthBendix {
    kind: CongruenceKind,
    presentation: Presentation,
    generating_pairs: Vec<(Word, Word)>,
    config: KnuthBendixConfig,
    rewriter: Rewriter,
    /// FIFO queue of rule-id pairs awaiting overlap examination.
    pairs: VecDeque<(RuleId, RuleId)>,
    state: RunState,
    /// Letter relabelling for [`ReductionOrder::CustomShortlex`]:
    /// `(external → internal, internal → external)`.
    relabel: Option<(Vec<Letter>, Vec<Letter>)>,
    checkpoints: u64,
}

impl KnuthBendix {
    /// A new engine for the two-sided congruence defined by
    /// `presentation`, with default configuration.
    pub fn new(kind: CongruenceKind, presentation: Presentation) -> Result<Self, KnuthBendixError> {
        Self::with_config(kind, presentation, KnuthBendixConfig::default())
    }

    /// A new engine with explicit configuration.
    ///
    /// Only two-sided congruences are supported: rewriting applies rules
    /// in arbitrary context, which is exactly two-sided closure.
    pub fn with_config(
        kind: CongruenceKind,
        presentation: Presentation,
        config: KnuthBendixConfig,
    ) -> Result<Self, KnuthBendixError> {
        if kind != CongruenceKind::TwoSided {
            return Err(KnuthBendixError::InvalidArgument(
                "KnuthBendix supports two-sided congruences only".to_string(),
            ));
        }
        presentation.validate()?;

        let relabel = match &config.reduction_order {
            ReductionOrder::CustomShortlex(order) => {
                Some(Self::relabel_tables(order, presentation.alphabet_size())?)
            }
            _ => None,
        };
        let rewriter_order = match &config.reduction_order {
            ReductionOrder::Recursive => WordOrder::Recursive,
            _ => WordOrder::Shortlex,
        };
        let mut rewriter = Rewriter::new(
            presentation.alphabet_size(),
            rewriter_order,
            config.rewriter_backend,
        );

        for (u, v) in presentation.rules() {
            let u = apply_relabel(&relabel, u);
            let v = apply_relabel(&relabel, v);
            rewriter.add_pending_unchecked(u, v);
        }
        let mut engine = Self {
            kind,
            presentation,
            generating_pairs: Vec::new(),
            config,
            rewriter,
            pairs: VecDeque::new(),
            state: RunState::NotStarted,
            relabel,
            checkpoints: 0,
        };
        let activated = engine.rewriter.process_pending_rules();
        engine.push_pairs(&activated);
        Ok(engine)
    }

    fn relabel_tables(
        order: &[Letter],
        alphabet_size: usize,
    ) -> Result<(Vec<Letter>, Vec<Letter>), KnuthBendixError> {
        if order.len() != alphabet_size {
            return Err(KnuthBendixError::InvalidArgument(format!(
                "custom letter order has {} letters, the alphabet has {}",
                order.len(),
                alphabet_size
            )));
        }
        let mut to_internal = vec![0 as Letter; alphabet_size];
        let mut to_external = vec![0 as Letter; alphabet_size];
        let mut seen = vec![false; alphabet_size];
        for (rank, &letter) in order.iter().enumerate() {
            if usize::from(letter) >= alphabet_size || seen[usize::from(letter)] {
                return Err(KnuthBendixError::InvalidArgument(
                    "custom letter order must be a permutation of the alphabet".to_string(),
                ));
            }
            seen[usize::from(letter)] = true;
            to_internal[usize::from(letter)] = rank as Letter;
            to_external[rank] = letter;
        }
        Ok((to_internal, to_external))
    }

    /// The congruence kind (always two-sided).
    pub fn kind(&self) -> CongruenceKind {
        self.kind
    }

    /// The presentation this engine was seeded from.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// The generating pairs added so far.
    pub fn generating_pairs(&self) -> &[(Word, Word)] {
        &self.generating_pairs
    }

    /// Mutable access to the configuration; refused once running.
    pub fn config(&self) -> &KnuthBendixConfig {
        &self.config
    }

    /// Raises or lowers the pending-rule limit (legal at any time).
    pub fn set_max_pending_rules(&mut self, value: usize) -> &mut Self {
        self.config.max_pending_rules = value;
        self
    }

    /// Raises or lowers the active-rule limit (legal at any time).
    pub fn set_max_rules(&mut self, value: usize) -> &mut Self {
        self.config.max_rules = value;
        self
    }

    /// Declares `u = v` in the congruence.
    ///
    /// Refused once the run has started.
    pub fn add_generating_pair(&mut self, u: &[Letter], v: &[Letter]) -> Result<(), KnuthBendixError> {
        if self.state.started() {
            return Err(KnuthBendixError::EngineNotReady(
                "generating pairs cannot be added after run".to_string(),
            ));
        }
        self.presentation.validate_word(u)?;
        self.presentation.validate_word(v)?;
        self.generating_pairs.push((u.to_vec(), v.to_vec()));
        let u = apply_relabel(&self.relabel, u);
        let v = apply_relabel(&self.relabel, v);
        self.rewriter.add_pending_unchecked(u, v);
        let activated = self.rewriter.process_pending_rules();
        self.push_pairs(&activated);
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Running
    // --------------------------------------------------------------------------------------------

    /// Whether completion has finished (the rule set is confluent).
    pub fn finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Runs to completion (or to a limit error).
    pub fn run(&mut self) -> Result<(), KnuthBendixError> {
        self.run_with_policy(StopPolicy::none(), |_| false)
    }

    /// Runs until `duration` has elapsed; timing out is not an error.
    pub fn run_for(&mut self, duration: Duration) -> Result<(), KnuthBendixError> {
        self.run_with_policy(StopPolicy::timeout(duration), |_| false)
    }

    /// Runs until `predicate` returns true at a checkpoint.
    pub fn run_until<P>(&mut self, predicate: P) -> Result<(), KnuthBendixError>
    where
        P: FnMut(&Self) -> bool,
    {
        self.run_with_policy(StopPolicy::none(), predicate)
    }

    fn run_with_policy<P>(&mut self, policy: StopPolicy, mut predicate: P) -> Result<(), KnuthBendixError>
    where
        P: FnMut(&Self) -> bool,
    {
        if self.finished() {
            return Ok(());
        }
        self.state = RunState::Running;
        loop {
            if self.step()? {
                info!(
                    active_rules = self.rewriter.number_of_active_rules(),
                    "Knuth-Bendix completion finished"
                );
                return Ok(());
            }
            self.checkpoints += 1;
            if reporting_enabled() && self.checkpoints % 4096 == 0 {
                info!(
                    active_rules = self.rewriter.number_of_active_rules(),
                    pending_rules = self.rewriter.number_of_pending_rules(),
                    pairs = self.pairs.len(),
                    "Knuth-Bendix progress"
                );
            }
            if policy.should_stop() || predicate(self) {
                self.state = RunState::Stopped;
                return Ok(());
            }
        }
    }

    /// One checkpoint: process one overlap pair and drain pending rules.
    /// Returns true when the pair queue is exhausted (confluence).
    fn step(&mut self) -> Result<bool, KnuthBendixError> {
        let pair = loop {
            match self.pairs.pop_front() {
                Some((r, s)) if self.rewriter.is_active(r) && self.rewriter.is_active(s) => {
                    break Some((r, s));
                }
                Some(_) => continue,
                None => break None,
            }
        };
        let Some((r, s)) = pair else {
            self.state = RunState::Finished;
            self.rewriter.set_confluence(Some(true));
            return Ok(true);
        };

        self.process_overlaps(r, s);

        let pending = self.rewriter.number_of_pending_rules();
        if pending > self.config.max_pending_rules {
            self.state = RunState::Stopped;
            // Keep the pair queue intact so the run can resume.
            self.pairs.push_front((r, s));
            return Err(KnuthBendixError::ResourceLimit {
                limit: "max_pending_rules",
                threshold: self.config.max_pending_rules,
                current: pending,
            });
        }
        let activated = self.rewriter.process_pending_rules();
        self.push_pairs(&activated);

        let active = self.rewriter.number_of_active_rules();
        if active > self.config.max_rules {
            self.state = RunState::Stopped;
            return Err(KnuthBendixError::ResourceLimit {
                limit: "max_rules",
                threshold: self.config.max_rules,
                current: active,
            });
        }
        Ok(false)
    }

    /// Forms every critical pair from overlaps of `r.lhs` suffixes with
    /// `s.lhs` prefixes and queues the unresolved ones as pending rules.
    fn process_overlaps(&mut self, r: RuleId, s: RuleId) {
        let (r_lhs, r_rhs) = {
            let (l, h) = self.rewriter.rule_sides(r);
            (l.clone(), h.clone())
        };
        let (s_lhs, s_rhs) = {
            let (l, h) = self.rewriter.rule_sides(s);
            (l.clone(), h.clone())
        };
        for p in 1..r_lhs.len() {
            let suffix = &r_lhs[p..];
            if suffix.len() >= s_lhs.len() || !s_lhs.starts_with(suffix) {
                continue;
            }
            // Critical word: r_lhs[..p] · s_lhs, reduced two ways.
            let mut first = r_rhs.clone();
            first.extend_from_slice(&s_lhs[suffix.len()..]);
            let mut second = r_lhs[..p].to_vec();
            second.extend_from_slice(&s_rhs);

            self.rewriter.reduce(&mut first);
            self.rewriter.reduce(&mut second);
            if first != second {
                debug!(?first, ?second, "unresolved critical pair");
                self.rewriter.add_pending_unchecked(first, second);
            }
        }
    }

    fn push_pairs(&mut self, activated: &[RuleId]) {
        for &id in activated {
            for other in self.rewriter.activation_order().to_vec() {
                self.pairs.push_back((id, other));
                if other != id {
                    self.pairs.push_back((other, id));
                }
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    /// Number of active rules.
    pub fn number_of_active_rules(&self) -> usize {
        self.rewriter.number_of_active_rules()
    }

    /// Number of pending rules.
    pub fn number_of_pending_rules(&self) -> usize {
        self.rewriter.number_of_pending_rules()
    }

    /// The active rules, translated back to external letters.
    pub fn active_rules(&self) -> Vec<(Word, Word)> {
        self.rewriter
            .active_rules()
            .map(|(l, r)| {
                (
                    unapply_relabel(&self.relabel, l),
                    unapply_relabel(&self.relabel, r),
                )
            })
            .collect()
    }

    /// Whether the engine has signalled confluence.
    pub fn confluent_known(&self) -> bool {
        self.rewriter.confluent_known() == Some(true)
    }

    /// Direct confluence check of the current active rules: every critical
    /// overlap must resolve. Does not mutate the engine.
    pub fn confluent(&self) -> bool {
        let ids: Vec<RuleId> = self.rewriter.activation_order().to_vec();
        for &r in &ids {
            for &s in &ids {
                let (r_lhs, r_rhs) = self.rewriter.rule_sides(r);
                let (s_lhs, s_rhs) = self.rewriter.rule_sides(s);
                for p in 1..r_lhs.len() {
                    let suffix = &r_lhs[p..];
                    if suffix.len() >= s_lhs.len() || !s_lhs.starts_with(suffix) {
                        continue;
                    }
                    let mut first = r_rhs.clone();
                    first.extend_from_slice(&s_lhs[suffix.len()..]);
                    let mut second = r_lhs[..p].to_vec();
                    second.extend_from_slice(s_rhs);
                    self.rewriter.reduce(&mut first);
                    self.rewriter.reduce(&mut second);
                    if first != second {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Reduces `word` to a normal form under the current active rules;
    /// canonical iff the engine is confluent.
    pub fn reduce(&self, word: &[Letter]) -> Result<Word, KnuthBendixError> {
        crate::word::validate_letters(word, self.presentation.alphabet_size())
            .map_err(PresentationError::Word)?;
        let mut internal = apply_relabel(&self.relabel, word);
        self.rewriter.reduce(&mut internal);
        Ok(unapply_relabel(&self.relabel, &internal))
    }

    /// Whether `u` and `v` are congruent, running to completion first.
    pub fn contains(&mut self, u: &[Letter], v: &[Letter]) -> Result<bool, KnuthBendixError> {
        self.run()?;
        Ok(self.reduce(u)? == self.reduce(v)?)
    }

    /// Tri-valued congruence test against the current partial rule set.
    pub fn currently_contains(&self, u: &[Letter], v: &[Letter]) -> Result<Tril, KnuthBendixError> {
        let u = self.reduce(u)?;
        let v = self.reduce(v)?;
        if u == v {
            Ok(Tril::True)
        } else if self.finished() {
            Ok(Tril::False)
        } else {
            Ok(Tril::Unknown)
        }
    }

    /// The number of congruence classes.
    ///
    /// Obvious-infinity detection runs first; otherwise the engine runs to
    /// confluence and counts irreducible words through the
    /// factor-avoidance automaton of the active left-hand sides.
    pub fn number_of_classes(&mut self) -> Result<Cardinality, KnuthBendixError> {
        if presentation::obviously_infinite(&self.presentation, &self.generating_pairs) {
            return Ok(Cardinality::Infinite);
        }
        self.run()?;
        let automaton = IrreducibleAutomaton::new(&self.rewriter);
        let total = match automaton.count_words() {
            None => return Ok(Cardinality::Infinite),
            Some(total) => total,
        };
        let total = if self.presentation.contains_empty_word() {
            total
        } else {
            total - 1
        };
        Ok(Cardinality::Finite(total))
    }

    /// Lazy shortlex enumeration of irreducible words (the normal forms,
    /// once the engine is confluent). Letters are external.
    pub fn normal_forms(&self) -> NormalForms<'_> {
        let lhs_list: Vec<Word> = self
            .rewriter
            .active_rules()
            .map(|(l, _)| l.clone())
            .collect();
        let mut frontier = VecDeque::new();
        frontier.push_back(Word::new());
        NormalForms {
            engine: self,
            lhs_list,
            frontier,
            yielded_empty: !self.presentation.contains_empty_word(),
        }
    }
}

impl fmt::Display for KnuthBendix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} KnuthBendix over {} with {} generating pairs, {} active rules, {} pending rules>",
            self.kind,
            self.presentation,
            self.generating_pairs.len(),
            self.rewriter.number_of_active_rules(),
            self.rewriter.number_of_pending_rules()
        )
    }
}

fn apply_relabel(relabel: &Option<(Vec<Letter>, Vec<Letter>)>, word: &[Letter]) -> Word {
    match relabel {
        Some((to_internal, _)) => word.iter().map(|&a| to_internal[usize::from(a)]).collect(),
        None => word.to_vec(),
    }
}

fn unapply_relabel(relabel: &Option<(Vec<Letter>, Vec<Letter>)>, word: &[Letter]) -> Word {
    match relabel {
        Some((_, to_external)) => word.iter().map(|&a| to_external[usize::from(a)]).collect(),
        None => word.to_vec(),
    }
}

// ------------------------------------------------------------------------------------------------
// Normal forms
// ------------------------------------------------------------------------------------------------

/// Lazy shortlex sequence of irreducible words (see
/// [`KnuthBendix::normal_forms`]). Restartable: create a fresh instance.
pub struct NormalForms<'a> {
    engine: &'a KnuthBendix,
    lhs_list: Vec<Word>,
    frontier: VecDeque<Word>,
    yielded_empty: bool,
}

impl NormalForms<'_> {
    /// An extension of an irreducible word is irreducible iff no
    /// left-hand side is a suffix of it.
    fn is_irreducible_extension(&self, word: &Word) -> bool {
        !self
            .lhs_list
            .iter()
            .any(|lhs| lhs.len() <= word.len() && word[word.len() - lhs.len()..] == lhs[..])
    }
}

impl Iterator for NormalForms<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        loop {
            let word = self.frontier.pop_front()?;
            for a in 0..self.engine.presentation.alphabet_size() as u8 {
                let mut extended = word.clone();
                extended.push(a);
                if self.is_irreducible_extension(&extended) {
                    self.frontier.push_back(extended);
                }
            }
            if word.is_empty() && self.yielded_empty {
                continue;
            }
            self.yielded_empty = self.yielded_empty || word.is_empty();
            return Some(unapply_relabel(&self.engine.relabel, &word));
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Irreducible-word automaton
// ------------------------------------------------------------------------------------------------

/// Deterministic automaton of words avoiding every active left-hand side
/// as a factor; used to count classes and detect infinity.
struct IrreducibleAutomaton {
    alphabet_size: usize,
    /// `transitions[state * alphabet + letter]`, `usize::MAX` = dead.
    transitions: Vec<usize>,
    states: usize,
}

impl IrreducibleAutomaton {
    fn new(rewriter: &Rewriter) -> Self {
        let alphabet_size = rewriter.alphabet_size();
        let lhs_list: Vec<Word> = rewriter.active_rules().map(|(l, _)| l.clone()).collect();

        // States are the factor-closed set of proper prefixes of left-hand
        // sides, identified by longest-suffix matching (Aho–Corasick
        // collapsed to a DFA).
        let mut prefixes: Vec<Word> = vec![Word::new()];
        for lhs in &lhs_list {
            for len in 1..lhs.len() {
                let prefix = lhs[..len].to_vec();
                if !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        let states = prefixes.len();
        let mut transitions = vec![usize::MAX; states * alphabet_size];
        for (i, prefix) in prefixes.iter().enumerate() {
            for a in 0..alphabet_size as u8 {
                let mut extended = prefix.clone();
                extended.push(a);
                // Dead when some lhs is a suffix of the extension.
                if lhs_list.iter().any(|l| contains_factor_at_end(&extended, l)) {
                    continue;
                }
                // Otherwise the state is the longest stored suffix.
                let mut target = None;
                for start in 0..=extended.len() {
                    if let Some(i) = prefixes.iter().position(|p| p[..] == extended[start..]) {
                        target = Some(i);
                        break;
                    }
                }
                transitions[i * alphabet_size + usize::from(a)] =
                    target.expect("empty prefix always matches");
            }
        }
        Self {
            alphabet_size,
            transitions,
            states,
        }
    }

    /// Number of words accepted (including the empty word), or `None`
    /// when a live cycle makes the language infinite.
    fn count_words(&self) -> Option<u64> {
        // Cycle detection by colours, then memoised path counting.
        const WHITE: u8 = 0;
        const GREY: u8 = 1;
        const BLACK: u8 = 2;
        let mut colour = vec![WHITE; self.states];
        let mut counts: Vec<u64> = vec![0; self.states];
        // Iterative DFS from the root state 0.
        enum Frame {
            Enter(usize),
            Exit(usize),
        }
        let mut stack = vec![Frame::Enter(0)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(s) => {
                    if colour[s] == BLACK {
                        continue;
                    }
                    if colour[s] == GREY {
                        continue;
                    }
                    colour[s] = GREY;
                    stack.push(Frame::Exit(s));
                    for a in 0..self.alphabet_size {
                        let t = self.transitions[s * self.alphabet_size + a];
                        if t == usize::MAX {
                            continue;
                        }
                        if colour[t] == GREY {
                            return None; // live cycle: infinitely many words
                        }
                        if colour[t] == WHITE {
                            stack.push(Frame::Enter(t));
                        }
                    }
                }
                Frame::Exit(s) => {
                    let mut total: u64 = 1;
                    for a in 0..self.alphabet_size {
                        let t = self.transitions[s * self.alphabet_size + a];
                        if t != usize::MAX {
                            total = total.saturating_add(counts[t]);
                        }
                    }
                    counts[s] = total;
                    colour[s] = BLACK;
                }
            }
        }
        Some(counts[0])
    }
}

/// Whether `needle` is a suffix of `haystack`.
fn contains_factor_at_end(haystack: &[Letter], needle: &[Letter]) -> bool {
    needle.len() <= haystack.len() && haystack[haystack.len() - needle.len()..] == needle[..]
}
