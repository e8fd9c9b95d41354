//! # Rewriter Module
//!
//! An ordered, terminating rule set with in-place word reduction and
//! incremental rule insertion. This is the shared substrate of the
//! Knuth–Bendix engine.
//!
//! ## Rule Lifecycle
//!
//! - **pending** — inserted but not yet indexed; drained by
//!   [`Rewriter::process_pending_rules`].
//! - **active** — participating in reduction and critical-pair search.
//! - **inactive** — subsumed or redundant; the slot is kept as dead
//!   storage and recycled by later activations.
//!
//! ## Back-ends
//!
//! Two interchangeable reduction back-ends, selected at construction:
//!
//! - [`RewriterBackend::List`] — a sorted container of active rules;
//!   reduction scans left to right applying, at the leftmost matching
//!   position, the rule with the longest left-hand side (ties broken
//!   shortlex).
//! - [`RewriterBackend::Trie`] — an Aho–Corasick automaton over left-hand
//!   sides giving reduction time proportional to the word length per
//!   rewrite step. Failure links are rebuilt from scratch every time a
//!   pending drain changes the rule set; incremental failure-link
//!   maintenance is deliberately not attempted.
//!
//! Both back-ends share the reduction order (shortlex by default) and
//! produce identical normal forms once the owning engine has signalled
//! confluence.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


mod list;
mod trie;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::VecDeque;

use thiserror::Error;
use tracing::trace;

use crate::word::{self, Word, WordError, WordOrder};

use list::ListIndex;
use trie::Trie;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`Rewriter`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriterError {
    /// A rule side contained a letter outside the alphabet.
    #[error("invalid rule: {0}")]
    InvalidRule(#[from] WordError),
}

// ------------------------------------------------------------------------------------------------
// Types
// ------------------------------------------------------------------------------------------------

/// Which reduction back-end a [`Rewriter`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriterBackend {
    /// Sorted indexed list of active rules.
    List,

    /// Trie with failure links over the left-hand sides.
    #[default]
    Trie,
}

/// Identifier of a rule slot inside a [`Rewriter`].
pub type RuleId = usize;

/// An oriented rule `lhs → rhs` with `lhs > rhs` in the reduction order.
#[derive(Debug, Clone)]
pub(crate) struct Rule {
    pub(crate) lhs: Word,
    pub(crate) rhs: Word,
    pub(crate) active: bool,
}

#[derive(Debug)]
enum Backend {
    List(ListIndex),
    Trie(Trie),
}

// ------------------------------------------------------------------------------------------------
// Rewriter
// ------------------------------------------------------------------------------------------------

/// Ordered terminating rule set with incremental insertion and in-place
/// reduction.
#[derive(Debug)]
pub struct Rewriter {
    alphabet_size: usize,
    order: WordOrder,
    rules: Vec<Rule>,
    free_slots: Vec<RuleId>,
    /// Active rule ids in activation order; drives critical-pair fairness.
    activation_order: Vec<RuleId>,
    pending: VecDeque<(Word, Word)>,
    backend: Backend,
    confluence_known: Option<bool>,
}

impl Rewriter {
    /// A rewriter over `alphabet_size` letters.
    pub fn new(alphabet_size: usize, order: WordOrder, backend: RewriterBackend) -> Self {
        let backend = match backend {
            RewriterBackend::List => Backend::List(ListIndex::new()),
            RewriterBackend::Trie => Backend::Trie(Trie::new(alphabet_size)),
        };
        Self {
            alphabet_size,
            order,
            rules: Vec::new(),
            free_slots: Vec::new(),
            activation_order: Vec::new(),
            pending: VecDeque::new(),
            backend,
            confluence_known: None,
        }
    }

    /// The reduction order rules are oriented by.
    pub fn order(&self) -> WordOrder {
        self.order
    }

    /// The alphabet size reductions are defined over.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Number of active rules.
    pub fn number_of_active_rules(&self) -> usize {
        self.activation_order.len()
    }

    /// Number of dead slots kept for recycling.
    pub fn number_of_inactive_rules(&self) -> usize {
        self.rules.len() - self.activation_order.len()
    }

    /// Number of rules waiting in the pending queue.
    pub fn number_of_pending_rules(&self) -> usize {
        self.pending.len()
    }

    /// Whether the owning engine has signalled confluence (or its
    /// absence); `None` until signalled.
    pub fn confluent_known(&self) -> Option<bool> {
        self.confluence_known
    }

    pub(crate) fn set_confluence(&mut self, value: Option<bool>) {
        self.confluence_known = value;
    }

    /// Active rules as `(lhs, rhs)` pairs, in activation order.
    pub fn active_rules(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.activation_order
            .iter()
            .map(|&id| (&self.rules[id].lhs, &self.rules[id].rhs))
    }

    pub(crate) fn activation_order(&self) -> &[RuleId] {
        &self.activation_order
    }

    pub(crate) fn is_active(&self, id: RuleId) -> bool {
        self.rules[id].active
    }

    pub(crate) fn rule_sides(&self, id: RuleId) -> (&Word, &Word) {
        (&self.rules[id].lhs, &self.rules[id].rhs)
    }

    /// Whether `lhs = rhs` (in either orientation) is an active rule.
    pub fn contains_rule(&self, lhs: &[u8], rhs: &[u8]) -> bool {
        self.activation_order.iter().any(|&id| {
            let rule = &self.rules[id];
            (rule.lhs == lhs && rule.rhs == rhs) || (rule.lhs == rhs && rule.rhs == lhs)
        })
    }

    /// Inserts a pending rule.
    ///
    /// The pair is oriented so the reduction-order-larger side becomes the
    /// left-hand side; trivial pairs are eliminated later by
    /// [`Rewriter::process_pending_rules`].
    pub fn add_rule(&mut self, u: &[u8], v: &[u8]) -> Result<(), RewriterError> {
        word::validate_letters(u, self.alphabet_size)?;
        word::validate_letters(v, self.alphabet_size)?;
        let (lhs, rhs) = match self.order.compare(u, v) {
            Ordering::Less => (v.to_vec(), u.to_vec()),
            _ => (u.to_vec(), v.to_vec()),
        };
        self.pending.push_back((lhs, rhs));
        self.confluence_known = None;
        Ok(())
    }

    pub(crate) fn add_pending_unchecked(&mut self, u: Word, v: Word) {
        let (lhs, rhs) = match self.order.compare(&u, &v) {
            Ordering::Less => (v, u),
            _ => (u, v),
        };
        self.pending.push_back((lhs, rhs));
        self.confluence_known = None;
    }

    /// Reduces `word` in place to a normal form under the active rules.
    ///
    /// The result is *the* canonical form if and only if the owning engine
    /// has signalled confluence.
    pub fn reduce(&self, word: &mut Word) {
        match &self.backend {
            Backend::List(index) => index.reduce(&self.rules, word),
            Backend::Trie(trie) => trie.reduce(&self.rules, word),
        }
    }

    /// Drains the pending queue.
    ///
    /// Each pending pair is reduced by the current active set; trivial
    /// pairs are dropped; surviving pairs are activated, and active rules
    /// whose left-hand side contains the new left-hand side as a factor
    /// are demoted back to the pending queue. Right-hand sides of
    /// surviving rules are kept reduced in place.
    ///
    /// Returns the ids of the rules activated by this drain, in activation
    /// order.
    pub fn process_pending_rules(&mut self) -> Vec<RuleId> {
        let mut activated = Vec::new();
        while let Some((mut lhs, mut rhs)) = self.pending.pop_front() {
            // The drain itself changes the rule set, so the trie is
            // rebuilt before each reduction that could see a new rule.
            self.refresh_index();
            self.reduce(&mut lhs);
            self.reduce(&mut rhs);
            if lhs == rhs {
                continue;
            }
            if self.order.compare(&lhs, &rhs) == Ordering::Less {
                std::mem::swap(&mut lhs, &mut rhs);
            }
            let id = self.activate(lhs, rhs);
            activated.push(id);
            self.demote_subsumed(id);
        }
        self.refresh_index();
        trace!(
            active = self.number_of_active_rules(),
            activated = activated.len(),
            "pending queue drained"
        );
        activated
    }

    fn activate(&mut self, lhs: Word, rhs: Word) -> RuleId {
        let id = if let Some(id) = self.free_slots.pop() {
            self.rules[id] = Rule {
                lhs,
                rhs,
                active: true,
            };
            id
        } else {
            self.rules.push(Rule {
                lhs,
                rhs,
                active: true,
            });
            self.rules.len() - 1
        };
        self.activation_order.push(id);
        match &mut self.backend {
            Backend::List(index) => index.insert(&self.rules, id),
            Backend::Trie(trie) => trie.mark_dirty(),
        }
        id
    }

    fn deactivate(&mut self, id: RuleId) {
        self.rules[id].active = false;
        self.activation_order.retain(|&r| r != id);
        self.free_slots.push(id);
        match &mut self.backend {
            Backend::List(index) => index.remove(id),
            Backend::Trie(trie) => trie.mark_dirty(),
        }
    }

    /// Demotes active rules subsumed by rule `new_id` and re-reduces
    /// surviving right-hand sides.
    fn demote_subsumed(&mut self, new_id: RuleId) {
        let new_lhs = self.rules[new_id].lhs.clone();
        let candidates: Vec<RuleId> = self
            .activation_order
            .iter()
            .copied()
            .filter(|&id| id != new_id)
            .collect();
        let mut rhs_stale = Vec::new();
        for id in candidates {
            if contains_factor(&self.rules[id].lhs, &new_lhs) {
                let lhs = self.rules[id].lhs.clone();
                let rhs = self.rules[id].rhs.clone();
                self.deactivate(id);
                self.pending.push_back((lhs, rhs));
            } else if contains_factor(&self.rules[id].rhs, &new_lhs) {
                rhs_stale.push(id);
            }
        }
        self.refresh_index();
        for id in rhs_stale {
            let mut rhs = self.rules[id].rhs.clone();
            self.reduce(&mut rhs);
            self.rules[id].rhs = rhs;
        }
    }

    /// Called by the owning engine when a drain has finished, so the trie
    /// back-end can rebuild its failure links once per drain.
    pub(crate) fn refresh_index(&mut self) {
        if let Backend::Trie(trie) = &mut self.backend {
            trie.rebuild_if_dirty(&self.rules, &self.activation_order);
        }
    }
}

/// Whether `needle` occurs as a (contiguous) factor of `haystack`.
pub(crate) fn contains_factor(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
