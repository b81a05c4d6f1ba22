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

//! Module tracking the failure assumptions made along an execution.

use crate::model::{ForwardingRule, InterfaceId, TableEntry};

/// The failure assumptions accumulated along one execution: the interfaces
/// assumed to have failed and the interfaces already used by the packet. The
/// two sets are sorted, deduplicated and disjoint, and the failed set never
/// exceeds the failure bound.
///
/// The structure is persistent: every derivation returns a new value and the
/// originals are never mutated, so states sharing a prefix of assumptions
/// compare equal under `==` and hash identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EdgeStatus {
    failed: Vec<InterfaceId>,
    used: Vec<InterfaceId>,
}

impl EdgeStatus {
    /// Create an edge status from sorted interface sets.
    pub fn new(failed: Vec<InterfaceId>, used: Vec<InterfaceId>) -> Self {
        let status = Self { failed, used };
        debug_assert!(status.soundness_check(usize::MAX));
        status
    }

    /// The interfaces assumed to have failed.
    pub fn failed(&self) -> &[InterfaceId] {
        &self.failed
    }

    /// The interfaces already used by the packet.
    pub fn used(&self) -> &[InterfaceId] {
        &self.used
    }

    /// Derive the status after applying `rule` of `entry`. Returns `None` if
    /// the rule cannot fire under these assumptions: its outgoing interface
    /// has already failed, the failures implied by its higher-priority
    /// siblings exceed `max_failures`, or an implied failure collides with an
    /// interface that is already in use.
    pub fn next_edge_state(
        &self,
        entry: &TableEntry,
        rule: &ForwardingRule,
        max_failures: usize,
    ) -> Option<EdgeStatus> {
        if self.failed.binary_search(&rule.via).is_ok() {
            return None; // cannot use an edge that was already assumed failed
        }

        // Rules with smaller priority must fail for this rule to be applicable.
        let mut new_failed: Vec<InterfaceId> = entry
            .rules
            .iter()
            .filter(|other| other.priority < rule.priority)
            .map(|other| other.via)
            .collect();
        if new_failed.is_empty() {
            // common special case
            return Some(EdgeStatus {
                failed: self.failed.clone(),
                used: Self::add_to_set(&self.used, rule.via),
            });
        }
        new_failed.sort_unstable();
        new_failed.dedup();

        let mut next_failed = self.failed.clone();
        next_failed.extend_from_slice(&new_failed);
        next_failed.sort_unstable();
        next_failed.dedup();
        if next_failed.len() > max_failures {
            return None;
        }

        let next_used = Self::add_to_set(&self.used, rule.via);
        debug_assert!(Self::is_disjoint(&self.failed, &next_used));
        if !Self::is_disjoint(&new_failed, &next_used) {
            return None; // failed and used must stay disjoint
        }

        Some(EdgeStatus { failed: next_failed, used: next_used })
    }

    /// Check the structural invariants: both sets sorted and duplicate-free,
    /// disjoint, and the failed set within the bound.
    pub fn soundness_check(&self, max_failures: usize) -> bool {
        let sorted_unique =
            |v: &[InterfaceId]| v.windows(2).all(|w| w[0] < w[1]);
        sorted_unique(&self.failed)
            && sorted_unique(&self.used)
            && self.failed.len() <= max_failures
            && Self::is_disjoint(&self.failed, &self.used)
    }

    fn add_to_set(set: &[InterfaceId], elem: InterfaceId) -> Vec<InterfaceId> {
        match set.binary_search(&elem) {
            Ok(_) => set.to_vec(),
            Err(pos) => {
                let mut next = Vec::with_capacity(set.len() + 1);
                next.extend_from_slice(&set[..pos]);
                next.push(elem);
                next.extend_from_slice(&set[pos..]);
                next
            }
        }
    }

    fn is_disjoint(a: &[InterfaceId], b: &[InterfaceId]) -> bool {
        let mut it_a = a.iter().peekable();
        let mut it_b = b.iter().peekable();
        while let (Some(x), Some(y)) = (it_a.peek(), it_b.peek()) {
            if x < y {
                it_a.next();
            } else if y < x {
                it_b.next();
            } else {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Action, Label};

    fn entry(priorities_and_vias: &[(u32, InterfaceId)]) -> TableEntry {
        TableEntry {
            top_label: Label::Mpls(1),
            rules: priorities_and_vias
                .iter()
                .map(|(priority, via)| ForwardingRule {
                    priority: *priority,
                    weight: 0,
                    via: *via,
                    ops: vec![Action::Pop],
                })
                .collect(),
        }
    }

    #[test]
    fn test_preferred_rule_needs_no_failures() {
        let e = entry(&[(0, 1), (1, 2)]);
        let status = EdgeStatus::default();
        let next = status.next_edge_state(&e, &e.rules[0], 0).unwrap();
        assert_eq!(next.failed(), &[] as &[InterfaceId]);
        assert_eq!(next.used(), &[1]);
        assert!(next.soundness_check(0));
    }

    #[test]
    fn test_backup_rule_fails_siblings() {
        let e = entry(&[(0, 1), (1, 2)]);
        let status = EdgeStatus::default();
        let next = status.next_edge_state(&e, &e.rules[1], 1).unwrap();
        assert_eq!(next.failed(), &[1]);
        assert_eq!(next.used(), &[2]);
        assert!(next.soundness_check(1));
        // with a failure bound of zero, the backup rule cannot fire
        assert_eq!(status.next_edge_state(&e, &e.rules[1], 0), None);
    }

    #[test]
    fn test_used_edge_cannot_fail() {
        let e = entry(&[(0, 1), (1, 2)]);
        let status = EdgeStatus::new(vec![], vec![1]);
        // rule 1 requires interface 1 to fail, but it was already used
        assert_eq!(status.next_edge_state(&e, &e.rules[1], 2), None);
    }

    #[test]
    fn test_failed_edge_cannot_be_used() {
        let e = entry(&[(0, 1), (1, 2)]);
        let status = EdgeStatus::new(vec![1], vec![]);
        assert_eq!(status.next_edge_state(&e, &e.rules[0], 2), None);
        // the backup rule is fine: interface 1 is already failed
        let next = status.next_edge_state(&e, &e.rules[1], 2).unwrap();
        assert_eq!(next.failed(), &[1]);
        assert_eq!(next.used(), &[2]);
    }

    #[test]
    fn test_sets_stay_sorted_and_disjoint() {
        let e = entry(&[(0, 9), (0, 4), (2, 6)]);
        let status = EdgeStatus::new(vec![2], vec![7]);
        let next = status.next_edge_state(&e, &e.rules[2], 3).unwrap();
        assert_eq!(next.failed(), &[2, 4, 9]);
        assert_eq!(next.used(), &[6, 7]);
        assert!(next.soundness_check(3));
    }
}
