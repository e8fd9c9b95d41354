//! Trie-with-failure-links reduction back-end.
//!
//! An Aho–Corasick automaton over the active left-hand sides. Each rewrite
//! step costs time proportional to the word length. The automaton is
//! rebuilt from scratch whenever the rule set changes during a pending
//! drain; failure links are never maintained incrementally.

use std::collections::VecDeque;

use super::{Rule, RuleId};
use crate::word::Word;

const NO_CHILD: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct TrieNode {
    children: Vec<u32>,
    fail: u32,
    /// The longest active left-hand side ending at this node, if any.
    rule: Option<RuleId>,
}

impl TrieNode {
    fn new(alphabet_size: usize) -> Self {
        Self {
            children: vec![NO_CHILD; alphabet_size],
            fail: 0,
            rule: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Trie {
    alphabet_size: usize,
    nodes: Vec<TrieNode>,
    dirty: bool,
}

impl Trie {
    pub(crate) fn new(alphabet_size: usize) -> Self {
        Self {
            alphabet_size,
            nodes: vec![TrieNode::new(alphabet_size)],
            dirty: false,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuilds the automaton from the active rules if the rule set has
    /// changed since the last build.
    pub(crate) fn rebuild_if_dirty(&mut self, rules: &[Rule], active: &[RuleId]) {
        if !self.dirty {
            return;
        }
        self.nodes.clear();
        self.nodes.push(TrieNode::new(self.alphabet_size));

        for &id in active {
            let mut state = 0usize;
            for &letter in &rules[id].lhs {
                let slot = usize::from(letter);
                if self.nodes[state].children[slot] == NO_CHILD {
                    self.nodes.push(TrieNode::new(self.alphabet_size));
                    let fresh = (self.nodes.len() - 1) as u32;
                    self.nodes[state].children[slot] = fresh;
                }
                state = self.nodes[state].children[slot] as usize;
            }
            self.nodes[state].rule = Some(id);
        }

        // Breadth-first failure links; shorter suffix matches are
        // inherited so any left-hand side ending at a node is detected.
        let mut queue = VecDeque::new();
        for slot in 0..self.alphabet_size {
            let child = self.nodes[0].children[slot];
            if child != NO_CHILD {
                self.nodes[child as usize].fail = 0;
                queue.push_back(child);
            }
        }
        while let Some(node) = queue.pop_front() {
            let node = node as usize;
            for slot in 0..self.alphabet_size {
                let child = self.nodes[node].children[slot];
                if child == NO_CHILD {
                    continue;
                }
                let fail = self.step(self.nodes[node].fail, slot as u8);
                self.nodes[child as usize].fail = fail;
                if self.nodes[child as usize].rule.is_none() {
                    self.nodes[child as usize].rule = self.nodes[fail as usize].rule;
                }
                queue.push_back(child);
            }
        }
        self.dirty = false;
    }

    fn step(&self, mut state: u32, letter: u8) -> u32 {
        let slot = usize::from(letter);
        loop {
            let child = self.nodes[state as usize].children[slot];
            if child != NO_CHILD {
                return child;
            }
            if state == 0 {
                return 0;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    pub(crate) fn reduce(&self, rules: &[Rule], word: &mut Word) {
        debug_assert!(!self.dirty, "trie used while stale");
        if self.nodes.len() == 1 || word.is_empty() {
            return;
        }
        let mut out: Vec<u8> = Vec::with_capacity(word.len());
        let mut states: Vec<u32> = Vec::with_capacity(word.len() + 1);
        states.push(0);
        let mut input: Vec<u8> = std::mem::take(word);
        input.reverse();

        while let Some(letter) = input.pop() {
            let state = self.step(*states.last().unwrap(), letter);
            out.push(letter);
            states.push(state);
            if let Some(id) = self.nodes[state as usize].rule {
                let lhs_len = rules[id].lhs.len();
                debug_assert!(lhs_len <= out.len());
                out.truncate(out.len() - lhs_len);
                states.truncate(out.len() + 1);
                input.extend(rules[id].rhs.iter().rev());
            }
        }
        *word = out;
    }
}
