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

//! Structural simplification of a PDA before solving.
//!
//! A control state can only take part in a derivation if it is reachable
//! from an initial state and can reach an accepting state in the rule graph.
//! Dropping every rule touching other states preserves the set of
//! initial-to-accepting derivations exactly; state indices are left intact so
//! traces of the reduced PDA are traces of the original.

use crate::pda::Pda;
use log::*;
use std::collections::VecDeque;

/// Reduce the PDA in place. Level 0 disables the reduction; every other
/// level removes all states and rules that cannot take part in any
/// initial-to-accepting derivation. Returns the number of removed states and
/// rules.
pub fn reduce(pda: &mut Pda, level: usize) -> (usize, usize) {
    if level == 0 || pda.num_states() == 0 {
        return (0, 0);
    }

    let n = pda.num_states();
    let mut forward = vec![false; n];
    let mut backward = vec![false; n];

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for rule in pda.rules() {
        successors[rule.from].push(rule.to);
        predecessors[rule.to].push(rule.from);
    }

    let mut queue: VecDeque<usize> = pda.initial().iter().copied().collect();
    for &s in pda.initial() {
        forward[s] = true;
    }
    while let Some(s) = queue.pop_front() {
        for &t in successors[s].iter() {
            if !forward[t] {
                forward[t] = true;
                queue.push_back(t);
            }
        }
    }

    let mut queue: VecDeque<usize> = pda.accepting().iter().copied().collect();
    for &s in pda.accepting() {
        backward[s] = true;
    }
    while let Some(s) = queue.pop_front() {
        for &t in predecessors[s].iter() {
            if !backward[t] {
                backward[t] = true;
                queue.push_back(t);
            }
        }
    }

    let useful: Vec<bool> = (0..n).map(|s| forward[s] && backward[s]).collect();
    let states_removed = useful.iter().filter(|u| !**u).count();
    let rules_removed = pda.retain_rules(|r| useful[r.from] && useful[r.to]);
    debug!("reduction removed {} states and {} rules", states_removed, rules_removed);
    (states_removed, rules_removed)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Label;
    use crate::pda::solver::post_star;
    use crate::pda::StackOp;
    use crate::query::Nfa;

    fn header(label: Label) -> Nfa<Label> {
        let mut nfa = Nfa::literal(vec![label], false);
        nfa.finalize();
        nfa
    }

    #[test]
    fn test_reduce_preserves_reachability() {
        let a = Label::Mpls(1);
        let mut pda = Pda::new(vec![a]);
        pda.set_num_states(5);
        pda.add_rule(0, Some(a), StackOp::Noop, 1, vec![]);
        pda.add_rule(1, Some(a), StackOp::Noop, 2, vec![]);
        // state 3 is unreachable, state 4 is a dead end
        pda.add_rule(3, Some(a), StackOp::Noop, 2, vec![]);
        pda.add_rule(1, Some(a), StackOp::Noop, 4, vec![]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![2]);

        let (before, _) = post_star(&pda, &header(a), &header(a));
        let (states_removed, rules_removed) = reduce(&mut pda, 1);
        assert_eq!(states_removed, 2);
        assert_eq!(rules_removed, 2);
        let (after, _) = post_star(&pda, &header(a), &header(a));
        assert_eq!(before, after);
        assert!(after);
    }

    #[test]
    fn test_reduce_level_zero_is_identity() {
        let a = Label::Mpls(1);
        let mut pda = Pda::new(vec![a]);
        pda.set_num_states(2);
        pda.add_rule(0, Some(a), StackOp::Noop, 1, vec![]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![1]);
        assert_eq!(reduce(&mut pda, 0), (0, 0));
        assert_eq!(pda.rules().len(), 1);
    }
}
