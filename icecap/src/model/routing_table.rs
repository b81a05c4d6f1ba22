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

//! Module defining the label-matching routing table of an interface.

use crate::model::{InterfaceId, Label};

/// A single header-rewriting operation of a forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Remove the top label.
    Pop,
    /// Replace the top label.
    Swap(Label),
    /// Push a new label on top of the stack.
    Push(Label),
}

impl Action {
    /// The label argument of the operation, if it has one.
    pub fn label(&self) -> Option<Label> {
        match self {
            Action::Pop => None,
            Action::Swap(l) | Action::Push(l) => Some(*l),
        }
    }
}

/// A forwarding rule of a routing-table entry.
///
/// The rule applies only when every rule of the same entry with a strictly
/// smaller priority forwards over an interface that is assumed to have
/// failed. An empty operation list forwards the header unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForwardingRule {
    /// Priority of the rule; smaller values are preferred.
    pub priority: u32,
    /// Custom cost of the rule, used by the weight expressions.
    pub weight: u32,
    /// The outgoing interface.
    pub via: InterfaceId,
    /// Header-rewriting operations, applied in order.
    pub ops: Vec<Action>,
}

/// A routing-table entry: all forwarding rules for one top-label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// The top-label this entry matches on. [`Label::Wildcard`] matches any
    /// label.
    pub top_label: Label,
    /// The forwarding rules, sorted by priority.
    pub rules: Vec<ForwardingRule>,
}

impl TableEntry {
    /// Returns true if this entry fires regardless of the top label.
    pub fn ignores_label(&self) -> bool {
        self.top_label.is_wildcard()
    }
}

/// The routing table of an interface, an ordered sequence of entries keyed by
/// their top-label. Due to the label ordering, a wildcard entry always sits
/// at the end of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    entries: Vec<TableEntry>,
}

impl RoutingTable {
    /// Create an empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, sorted by top-label.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Returns true if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the entry for the given top-label, creating it if necessary.
    pub fn emplace_entry(&mut self, top_label: Label) -> &mut TableEntry {
        let pos = match self.entries.binary_search_by(|e| e.top_label.cmp(&top_label)) {
            Ok(pos) => pos,
            Err(pos) => {
                self.entries.insert(pos, TableEntry { top_label, rules: Vec::new() });
                pos
            }
        };
        &mut self.entries[pos]
    }

    /// Insert a fully specified rule under the given top-label, keeping the
    /// rules of the entry sorted by priority.
    pub fn insert_rule(&mut self, top_label: Label, rule: ForwardingRule) {
        let entry = self.emplace_entry(top_label);
        let pos = entry
            .rules
            .binary_search_by(|r| r.priority.cmp(&rule.priority).then(std::cmp::Ordering::Less))
            .unwrap_or_else(|p| p);
        entry.rules.insert(pos, rule);
    }

    /// Insert a rule with priority and weight zero.
    pub fn add_rule(&mut self, top_label: Label, ops: Vec<Action>, via: InterfaceId) {
        self.insert_rule(top_label, ForwardingRule { priority: 0, weight: 0, via, ops });
    }

    /// All entries matching the given concrete label: the entry with the
    /// specific label first (if any), followed by the trailing wildcard entry
    /// (if any).
    pub fn entries_matching(&self, label: Label) -> Vec<&TableEntry> {
        let mut matching = Vec::new();
        if let Ok(pos) = self.entries.binary_search_by(|e| e.top_label.cmp(&label)) {
            matching.push(&self.entries[pos]);
        }
        match self.entries.last() {
            Some(last) if last.ignores_label() && !label.is_wildcard() => matching.push(last),
            _ => {}
        }
        matching
    }

    /// Clone every rule that forwards over `failed` into a backup rule with
    /// the next-worse priority: the clone appends a push of the failover
    /// label and redirects over `backup`. The backup rules only fire once
    /// `failed` is assumed down.
    pub fn add_failover_entries(
        &mut self,
        failed: InterfaceId,
        backup: InterfaceId,
        failover_label: Label,
    ) {
        for entry in self.entries.iter_mut() {
            let mut backups: Vec<ForwardingRule> = Vec::new();
            for rule in entry.rules.iter() {
                if rule.via != failed {
                    continue;
                }
                let mut ops = rule.ops.clone();
                ops.push(Action::Push(failover_label));
                backups.push(ForwardingRule {
                    priority: rule.priority + 1,
                    weight: rule.weight,
                    via: backup,
                    ops,
                });
            }
            entry.rules.extend(backups);
            entry.rules.sort_by_key(|r| r.priority);
        }
    }
}
