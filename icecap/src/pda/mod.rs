// Icecap: Verifying MPLS Networks under Link Failures
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Pushdown automata and reachability
//!
//! This module is the solving backend: a typed pushdown automaton over
//! header labels ([`Pda`]), the `post*`/`pre*` reachability procedures with
//! witness traces ([`solver`]), and the structural reducer ([`reducer`]).
//!
//! The label alphabet is fixed when the PDA is created; wildcard rules are
//! expanded over the alphabet at insertion time, so the solver only ever
//! deals with concrete labels. The bottom-of-stack label is part of every
//! alphabet but excluded from wildcard expansion, which guarantees that it
//! is never popped, pushed or swapped.

pub mod reducer;
pub mod solver;

pub use solver::{get_trace, post_star, post_star_shortest, pre_star, TraceState, Witness};

use crate::model::Label;
use std::collections::HashMap;

/// Index of a label in the PDA's alphabet.
pub type LabelId = usize;

/// A stack operation with interned labels, as stored on a PDA rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Remove the top symbol.
    Pop,
    /// Replace the top symbol.
    Swap(LabelId),
    /// Push a symbol on top of the matched one.
    Push(LabelId),
}

/// A stack operation as supplied by the PDA factory, before wildcard
/// expansion. [`StackOp::Noop`] keeps the matched label in place and is
/// resolved to a swap onto itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    /// Remove the top label.
    Pop,
    /// Replace the top label.
    Swap(Label),
    /// Push a label.
    Push(Label),
    /// Keep the header unchanged.
    Noop,
}

/// A rule of the pushdown automaton: in state `from` with `pre` on top of
/// the stack, apply `op` and move to state `to`.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Source state.
    pub from: usize,
    /// The label that must be on top of the stack.
    pub pre: LabelId,
    /// The operation applied to the top of the stack.
    pub op: Op,
    /// Target state.
    pub to: usize,
    /// Weight of the rule; empty when the PDA is unweighted.
    pub weight: Vec<u32>,
}

/// A typed pushdown automaton with a fixed label alphabet, initial and
/// accepting control states.
#[derive(Debug, Clone)]
pub struct Pda {
    labels: Vec<Label>,
    label_map: HashMap<Label, LabelId>,
    bottom: LabelId,
    num_states: usize,
    rules: Vec<Rule>,
    dedup: HashMap<(usize, LabelId, Op, usize), usize>,
    initial: Vec<usize>,
    accepting: Vec<usize>,
}

impl Pda {
    /// Create a PDA over the given alphabet. The bottom-of-stack label is
    /// added automatically.
    pub fn new(alphabet: Vec<Label>) -> Self {
        let mut labels = vec![Label::Bottom];
        labels.extend(alphabet.into_iter().filter(|l| !l.is_bottom() && !l.is_wildcard()));
        let label_map = labels.iter().enumerate().map(|(i, l)| (*l, i)).collect();
        Self {
            labels,
            label_map,
            bottom: 0,
            num_states: 0,
            rules: Vec::new(),
            dedup: HashMap::new(),
            initial: Vec::new(),
            accepting: Vec::new(),
        }
    }

    /// The id of the bottom-of-stack label.
    pub fn bottom(&self) -> LabelId {
        self.bottom
    }

    /// The number of labels, including the bottom-of-stack label.
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Look up the id of a concrete label.
    pub fn label_id(&self, label: Label) -> Option<LabelId> {
        self.label_map.get(&label).copied()
    }

    /// The label with the given id.
    pub fn label(&self, id: LabelId) -> Label {
        self.labels[id]
    }

    /// Declare the number of control states.
    pub fn set_num_states(&mut self, num_states: usize) {
        self.num_states = num_states;
    }

    /// The number of control states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// All rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Set the initial control states (sorted, deduplicated).
    pub fn set_initial(&mut self, mut initial: Vec<usize>) {
        initial.sort_unstable();
        initial.dedup();
        self.initial = initial;
    }

    /// Set the accepting control states (sorted, deduplicated).
    pub fn set_accepting(&mut self, mut accepting: Vec<usize>) {
        accepting.sort_unstable();
        accepting.dedup();
        self.accepting = accepting;
    }

    /// The initial control states.
    pub fn initial(&self) -> &[usize] {
        &self.initial
    }

    /// The accepting control states.
    pub fn accepting(&self) -> &[usize] {
        &self.accepting
    }

    /// Add a rule. A `pre` of `None` is a wildcard and expands to one rule
    /// per non-bottom alphabet label. Duplicate rules are merged, keeping
    /// the smaller weight.
    ///
    /// All labels must be part of the alphabet fixed at construction.
    pub fn add_rule(&mut self, from: usize, pre: Option<Label>, op: StackOp, to: usize, weight: Vec<u32>) {
        match pre {
            Some(label) => {
                let pre = self.label_map[&label];
                self.add_concrete_rule(from, pre, op, to, weight);
            }
            None => {
                for pre in 1..self.labels.len() {
                    self.add_concrete_rule(from, pre, op, to, weight.clone());
                }
            }
        }
    }

    fn add_concrete_rule(&mut self, from: usize, pre: LabelId, op: StackOp, to: usize, weight: Vec<u32>) {
        let op = match op {
            StackOp::Pop => Op::Pop,
            StackOp::Swap(l) => Op::Swap(self.label_map[&l]),
            StackOp::Push(l) => Op::Push(self.label_map[&l]),
            StackOp::Noop => Op::Swap(pre),
        };
        match self.dedup.get(&(from, pre, op, to)) {
            Some(idx) => {
                let existing = &mut self.rules[*idx];
                if weight < existing.weight {
                    existing.weight = weight;
                }
            }
            None => {
                self.dedup.insert((from, pre, op, to), self.rules.len());
                self.rules.push(Rule { from, pre, op, to, weight });
            }
        }
    }

    /// Remove all rules not satisfying the predicate. Returns the number of
    /// removed rules. Used by the reducer; rule deduplication is disabled
    /// afterwards.
    pub(crate) fn retain_rules<F: FnMut(&Rule) -> bool>(&mut self, mut f: F) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| f(r));
        self.dedup.clear();
        before - self.rules.len()
    }
}
