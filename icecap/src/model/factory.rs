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

//! Translation of a network and a query into a pushdown automaton, and the
//! reverse mapping from abstract solver traces back to concrete
//! routing-table decisions.
//!
//! A control state is the ingress interface the packet last arrived on, the
//! state of the path automaton, and the operations of the current forwarding
//! rule that have not been emitted yet. Multi-operation rules unroll into a
//! chain of intermediate states so that every PDA rule performs exactly one
//! stack operation. In UNDER mode the control state additionally carries the
//! failure assumptions accumulated so far, which restricts the automaton to
//! failure-consistent executions.

use crate::error::Error;
use crate::model::{
    Action, EdgeStatus, ForwardingRule, InterfaceId, Label, Network, TableEntry,
};
use crate::pda::{Pda, StackOp, TraceState};
use crate::query::{Mode, NetworkWeight, Query};
use log::*;
use serde_json::{json, Value};
use std::collections::HashMap;

/// A control state of the product automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    interface: InterfaceId,
    nfa: usize,
    ops: Vec<Action>,
    status: Option<EdgeStatus>,
}

/// Compiles the product of a network, a path automaton and a failure bound
/// into a [`Pda`], and concretizes abstract traces back into rule sequences.
#[derive(Debug)]
pub struct NetworkPdaFactory<'a> {
    network: &'a Network,
    query: &'a Query,
    weight: Option<&'a NetworkWeight>,
    states: Vec<StateKey>,
    state_map: HashMap<StateKey, usize>,
    initial: Vec<usize>,
    accepting: Vec<usize>,
}

impl<'a> NetworkPdaFactory<'a> {
    /// Create a factory for the given network and query.
    pub fn new(network: &'a Network, query: &'a Query, weight: Option<&'a NetworkWeight>) -> Self {
        Self {
            network,
            query,
            weight,
            states: Vec::new(),
            state_map: HashMap::new(),
            initial: Vec::new(),
            accepting: Vec::new(),
        }
    }

    /// Build the PDA. The alphabet is the network's label set extended by the
    /// labels mentioned in the query headers.
    pub fn compile(&mut self) -> Result<Pda, Error> {
        let mut alphabet = self.network.all_labels();
        alphabet.extend(self.query.prestack().symbols().copied());
        alphabet.extend(self.query.poststack().symbols().copied());
        alphabet.sort_unstable();
        alphabet.dedup();
        let mut pda = Pda::new(alphabet);

        self.make_initial_states();

        let network = self.network;
        let path = self.query.path();
        let k = self.query.failures();
        let under = self.query.mode() == Mode::Under;

        let mut from = 0;
        while from < self.states.len() {
            let key = self.states[from].clone();
            if key.ops.is_empty() {
                let inf = network.interface(key.interface);
                for entry in inf.table().entries() {
                    for rule in entry.rules.iter() {
                        let status = if under {
                            match key.status.as_ref().and_then(|s| s.next_edge_state(entry, rule, k))
                            {
                                Some(s) => Some(s),
                                None => continue,
                            }
                        } else {
                            if rule.priority as usize > k {
                                continue;
                            }
                            None
                        };
                        let first =
                            rule.ops.first().map(|op| to_stack_op(*op)).unwrap_or(StackOp::Noop);
                        let rest: Vec<Action> = rule.ops.iter().skip(1).copied().collect();
                        let pre =
                            if entry.ignores_label() { None } else { Some(entry.top_label) };
                        let weight = self.rule_weight(rule);
                        let nfa_targets: Vec<usize> = if network.interface(rule.via).is_virtual() {
                            vec![key.nfa]
                        } else {
                            let mut targets = Vec::new();
                            for edge in path.edges(key.nfa) {
                                if edge.contains(&rule.via) {
                                    targets.extend(path.closure(edge.to).iter().copied());
                                }
                            }
                            targets.sort_unstable();
                            targets.dedup();
                            targets
                        };
                        let target_inf = network.pair_of(rule.via);
                        for nfa in nfa_targets {
                            let to = self.add_state(
                                StateKey {
                                    interface: target_inf,
                                    nfa,
                                    ops: rest.clone(),
                                    status: status.clone(),
                                },
                                false,
                            );
                            pda.add_rule(from, pre, first, to, weight.clone());
                        }
                    }
                }
            } else {
                // unroll one pending operation with a wildcard rule
                let first = to_stack_op(key.ops[0]);
                let rest = key.ops[1..].to_vec();
                let to = self.add_state(
                    StateKey {
                        interface: key.interface,
                        nfa: key.nfa,
                        ops: rest,
                        status: key.status.clone(),
                    },
                    false,
                );
                pda.add_rule(from, None, first, to, self.zero_weight());
            }
            from += 1;
        }

        pda.set_num_states(self.states.len());
        pda.set_initial(self.initial.clone());
        pda.set_accepting(self.accepting.clone());
        debug!(
            "compiled PDA with {} states and {} rules ({} initial, {} accepting)",
            pda.num_states(),
            pda.rules().len(),
            pda.initial().len(),
            pda.accepting().len()
        );
        Ok(pda)
    }

    /// Enumerate the control states matching the first edges of the path
    /// automaton. The packet starts on the far side of a matched interface;
    /// virtual interfaces cannot start a path.
    fn make_initial_states(&mut self) {
        let network = self.network;
        let path = self.query.path();
        let status = match self.query.mode() {
            Mode::Under => Some(EdgeStatus::default()),
            _ => None,
        };
        let mut starts: Vec<(InterfaceId, usize)> = Vec::new();
        for &n0 in path.initial_closure() {
            for edge in path.edges(n0) {
                let next: Vec<usize> = path.closure(edge.to).to_vec();
                if edge.wildcard() {
                    for inf in network.interfaces() {
                        if !inf.is_virtual() {
                            for &n in next.iter() {
                                starts.push((network.pair_of(inf.global_id()), n));
                            }
                        }
                    }
                } else if !edge.negated {
                    for &symbol in edge.symbols.iter() {
                        if !network.interface(symbol).is_virtual() {
                            for &n in next.iter() {
                                starts.push((network.pair_of(symbol), n));
                            }
                        }
                    }
                } else {
                    for inf in network.interfaces() {
                        if edge.contains(&inf.global_id()) && !inf.is_virtual() {
                            for &n in next.iter() {
                                starts.push((network.pair_of(inf.global_id()), n));
                            }
                        }
                    }
                }
            }
        }
        for (interface, nfa) in starts {
            self.add_state(
                StateKey { interface, nfa, ops: Vec::new(), status: status.clone() },
                true,
            );
        }
    }

    fn add_state(&mut self, key: StateKey, initial: bool) -> usize {
        if let Some(&idx) = self.state_map.get(&key) {
            if initial && !self.initial.contains(&idx) {
                self.initial.push(idx);
            }
            return idx;
        }
        let idx = self.states.len();
        if self.is_accepting(&key) {
            self.accepting.push(idx);
        }
        if initial {
            self.initial.push(idx);
        }
        self.state_map.insert(key.clone(), idx);
        self.states.push(key);
        idx
    }

    /// A state accepts when no operations are pending, the interface is not
    /// virtual, and the path automaton accepts.
    fn is_accepting(&self, key: &StateKey) -> bool {
        key.ops.is_empty()
            && !self.network.interface(key.interface).is_virtual()
            && self.query.path().accepting(key.nfa)
    }

    fn rule_weight(&self, rule: &ForwardingRule) -> Vec<u32> {
        match self.weight {
            Some(w) => w.evaluate(self.network, rule, true),
            None => Vec::new(),
        }
    }

    fn zero_weight(&self) -> Vec<u32> {
        match self.weight {
            Some(w) => w.zero(),
            None => Vec::new(),
        }
    }

    /// Map an abstract trace to the concrete `(entry, rule)` decisions taken
    /// at each step. Returns `None` when the trace cannot be realized under a
    /// single failure assignment with at most k failures; such a trace is
    /// spurious.
    pub fn concretize_trace(
        &self,
        trace: &[TraceState],
    ) -> Result<Option<Vec<(&'a TableEntry, &'a ForwardingRule)>>, Error> {
        if self.query.mode() == Mode::Exact {
            return Err(Error::UnsupportedMode("tracing is not implemented for EXACT queries"));
        }
        let network = self.network;
        let k = self.query.failures();
        let over = self.query.mode() != Mode::Under;

        let mut status = EdgeStatus::default();
        let mut selected: Vec<(&'a TableEntry, &'a ForwardingRule)> = Vec::new();

        for sno in 0..trace.len() {
            let key = &self.states[trace[sno].state];
            if !key.ops.is_empty() {
                continue;
            }
            if sno + 1 == trace.len() || trace[sno].stack.is_empty() {
                continue;
            }
            let label = trace[sno].stack[0];
            let next_key = &self.states[trace[sno + 1].state];
            let next_stack = &trace[sno + 1].stack;
            let table = network.interface(key.interface).table();

            let mut found = false;
            'entries: for entry in table.entries_matching(label) {
                for rule in entry.rules.iter() {
                    if network.pair_of(rule.via) != next_key.interface {
                        continue;
                    }
                    if over && rule.priority as usize > k {
                        continue;
                    }
                    let stack_ok = match rule.ops.first() {
                        None => {
                            next_stack.len() == trace[sno].stack.len() && next_stack[0] == label
                        }
                        Some(Action::Pop) => next_stack.len() + 1 == trace[sno].stack.len(),
                        Some(Action::Swap(l)) => {
                            next_stack.len() == trace[sno].stack.len() && next_stack[0] == *l
                        }
                        Some(Action::Push(l)) => {
                            next_stack.len() == trace[sno].stack.len() + 1 && next_stack[0] == *l
                        }
                    };
                    if !stack_ok {
                        continue;
                    }
                    match status.next_edge_state(entry, rule, k) {
                        Some(next_status) => {
                            status = next_status;
                            selected.push((entry, rule));
                            found = true;
                            break 'entries;
                        }
                        None => continue,
                    }
                }
            }
            if !found {
                debug!("spurious trace: no failure-consistent rule at step {}", sno);
                return Ok(None);
            }
            debug_assert!(status.soundness_check(k));
        }
        Ok(Some(selected))
    }

    /// Render the abstract trace as the JSON sequence of link traversals and
    /// rule applications. Returns `None` when the trace is spurious.
    pub fn write_trace(&self, trace: &[TraceState]) -> Result<Option<Value>, Error> {
        let selected = match self.concretize_trace(trace)? {
            Some(selected) => selected,
            None => return Ok(None),
        };
        let mut output = Vec::new();
        let mut cnt = 0;
        for step in trace.iter() {
            let key = &self.states[step.state];
            if !key.ops.is_empty() {
                continue;
            }
            output.push(self.link_json(key.interface, &step.stack));
            if cnt < selected.len() {
                let (entry, rule) = selected[cnt];
                output.push(self.rule_json(key.interface, entry, rule));
                cnt += 1;
            }
        }
        Ok(Some(Value::Array(output)))
    }

    /// The link step onto the ingress interface `inf`, with the header after
    /// the traversal.
    fn link_json(&self, inf: InterfaceId, stack: &[Label]) -> Value {
        let network = self.network;
        let interface = network.interface(inf);
        let peer = network.interface(network.pair_of(inf));
        let stack: Vec<String> =
            stack.iter().filter(|l| !l.is_bottom()).map(|l| l.to_string()).collect();
        json!({
            "from_router": network.router(peer.router()).name(),
            "from_interface": peer.name(),
            "to_router": network.router(interface.router()).name(),
            "to_interface": interface.name(),
            "stack": stack,
        })
    }

    /// The application of `rule` of `entry` at the router owning `inf`.
    fn rule_json(&self, inf: InterfaceId, entry: &TableEntry, rule: &ForwardingRule) -> Value {
        let network = self.network;
        let pre =
            if entry.ignores_label() { "null".to_string() } else { entry.top_label.to_string() };
        let mut value = json!({
            "ingoing": network.interface(inf).name(),
            "pre": pre,
            "rule": rule_to_json(network, rule),
        });
        if let Some(weight) = self.weight {
            let weights: Vec<String> = weight
                .evaluate(network, rule, true)
                .into_iter()
                .map(|w| w.to_string())
                .collect();
            value["priority-weight"] = json!(weights);
        }
        value
    }
}

fn to_stack_op(action: Action) -> StackOp {
    match action {
        Action::Pop => StackOp::Pop,
        Action::Swap(l) => StackOp::Swap(l),
        Action::Push(l) => StackOp::Push(l),
    }
}

/// The JSON form of a forwarding rule, as used in network files and traces.
pub fn rule_to_json(network: &Network, rule: &ForwardingRule) -> Value {
    let ops: Vec<Value> = rule
        .ops
        .iter()
        .map(|op| match op {
            Action::Pop => json!({ "pop": "" }),
            Action::Swap(l) => json!({ "swap": l.to_string() }),
            Action::Push(l) => json!({ "push": l.to_string() }),
        })
        .collect();
    let mut value = json!({
        "out": network.interface(rule.via).name(),
        "priority": rule.priority,
        "ops": ops,
    });
    if rule.weight != 0 {
        value["weight"] = json!(rule.weight);
    }
    value
}
