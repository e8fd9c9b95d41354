//! Indexed-list reduction back-end.
//!
//! Active rules are kept in match-priority order: left-hand-side length
//! descending, then shortlex. Reduction scans the word left to right and
//! applies, at the leftmost matching position, the first rule in priority
//! order that matches there.

use super::{Rule, RuleId};
use crate::word::{Word, shortlex_cmp};

#[derive(Debug, Default)]
pub(crate) struct ListIndex {
    /// Active rule ids in match-priority order.
    sorted: Vec<RuleId>,
}

impl ListIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn priority(rules: &[Rule], a: RuleId, b: RuleId) -> std::cmp::Ordering {
        rules[b]
            .lhs
            .len()
            .cmp(&rules[a].lhs.len())
            .then_with(|| shortlex_cmp(&rules[a].lhs, &rules[b].lhs))
    }

    pub(crate) fn insert(&mut self, rules: &[Rule], id: RuleId) {
        let position = self
            .sorted
            .partition_point(|&other| Self::priority(rules, other, id) == std::cmp::Ordering::Less);
        self.sorted.insert(position, id);
    }

    pub(crate) fn remove(&mut self, id: RuleId) {
        self.sorted.retain(|&other| other != id);
    }

    pub(crate) fn reduce(&self, rules: &[Rule], word: &mut Word) {
        if self.sorted.is_empty() {
            return;
        }
        let max_lhs = self
            .sorted
            .iter()
            .map(|&id| rules[id].lhs.len())
            .max()
            .unwrap_or(0);
        let mut pos = 0;
        while pos < word.len() {
            let matched = self.sorted.iter().copied().find(|&id| {
                let lhs = &rules[id].lhs;
                pos + lhs.len() <= word.len() && word[pos..pos + lhs.len()] == lhs[..]
            });
            match matched {
                Some(id) => {
                    let lhs_len = rules[id].lhs.len();
                    let rhs = rules[id].rhs.clone();
                    word.splice(pos..pos + lhs_len, rhs);
                    // A new match can start anywhere overlapping the
                    // rewritten region.
                    pos = pos.saturating_sub(max_lhs - 1);
                }
                None => pos += 1,
            }
        }
    }
}
