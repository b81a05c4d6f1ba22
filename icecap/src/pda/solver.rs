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

//! The `post*` / `pre*` reachability procedures.
//!
//! Configurations `(state, stack)` are represented by runs of a finite
//! automaton whose words are stacks, read top-first and terminated by the
//! bottom-of-stack label. `post*` saturates the automaton of initial
//! configurations forward, `pre*` saturates the automaton of accepting
//! configurations backward. Every transition added during saturation records
//! the rule and the transitions that produced it, which makes it possible to
//! rebuild a witness trace afterwards.
//!
//! Transitions are finalized in order of increasing weight, so the recorded
//! provenance always refers to transitions finalized earlier and the
//! reconstruction terminates. With an unweighted PDA all weights are equal
//! and the order degenerates to first-in-first-out.

use crate::model::Label;
use crate::pda::{LabelId, Op, Pda};
use crate::query::nfa::{Nfa, NfaEdge};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// One step of an abstract trace: a control state and the stack at that
/// point, top-first and terminated by [`Label::Bottom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceState {
    /// The control state of the PDA.
    pub state: usize,
    /// The stack, top-first.
    pub stack: Vec<Label>,
}

/// An opaque witness of reachability, to be turned into a trace with
/// [`get_trace`].
#[derive(Debug)]
pub struct Witness {
    backward: bool,
    trans: Vec<Trans>,
    run: Vec<usize>,
    state: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TransKey {
    from: usize,
    /// `None` is the ε-transition introduced by pop rules during `post*`.
    label: Option<LabelId>,
    to: usize,
}

#[derive(Debug, Clone, Copy)]
enum Prov {
    /// Transition of the start automaton.
    Origin,
    /// `post*`: swap rule applied to `prev`.
    Swap { rule: usize, prev: usize },
    /// `post*`: pop rule applied to `prev`, yielding an ε-transition.
    PopEps { rule: usize, prev: usize },
    /// `post*`: the head transition into a push state.
    PushHead,
    /// `post*`: the tail transition of a push rule applied to `prev`.
    PushTail { rule: usize, prev: usize },
    /// `post*`: an ε-transition combined with a following transition.
    Combine { eps: usize, tail: usize },
    /// `pre*`: rule applied backwards over up to two transitions.
    Apply { rule: usize, path: [usize; 2], path_len: u8 },
}

#[derive(Debug, Clone)]
struct Trans {
    key: TransKey,
    weight: Vec<u32>,
    prov: Prov,
}

/// The saturated configuration automaton.
#[derive(Debug, Default)]
struct Automaton {
    trans: Vec<Trans>,
    index: HashMap<TransKey, usize>,
    by_from_label: HashMap<(usize, LabelId), Vec<usize>>,
    noneps_by_from: HashMap<usize, Vec<usize>>,
    eps_by_to: HashMap<usize, Vec<usize>>,
}

impl Automaton {
    fn contains(&self, key: &TransKey) -> bool {
        self.index.contains_key(key)
    }

    fn insert(&mut self, key: TransKey, weight: Vec<u32>, prov: Prov) -> usize {
        let id = self.trans.len();
        self.index.insert(key, id);
        match key.label {
            Some(label) => {
                self.by_from_label.entry((key.from, label)).or_default().push(id);
                self.noneps_by_from.entry(key.from).or_default().push(id);
            }
            None => {
                self.eps_by_to.entry(key.to).or_default().push(id);
            }
        }
        self.trans.push(Trans { key, weight, prov });
        id
    }
}

/// A transition waiting to be finalized, ordered by weight (ties broken by
/// insertion order).
#[derive(Debug)]
struct Pending {
    weight: Vec<u32>,
    seq: usize,
    key: TransKey,
    prov: Prov,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}
impl Eq for Pending {}
impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Pending {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight.cmp(&other.weight).then(self.seq.cmp(&other.seq))
    }
}

fn add_weights(a: &[u32], b: &[u32]) -> Vec<u32> {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| a.get(i).copied().unwrap_or(0) + b.get(i).copied().unwrap_or(0))
        .collect()
}

/// The non-bottom label ids matched by a header-NFA edge.
fn edge_label_ids(pda: &Pda, edge: &NfaEdge<Label>) -> Vec<LabelId> {
    (1..pda.num_labels()).filter(|id| edge.contains(&pda.label(*id))).collect()
}

/// Transitions of the automaton accepting the configurations
/// `(p, w·⊥)` with `p` an anchor state and `w` in the header language.
/// The automaton states are: the PDA states, one state per header-NFA state
/// (offset by the number of PDA states), and the single final state.
fn start_transitions(pda: &Pda, header: &Nfa<Label>, anchors: &[usize]) -> (Vec<TransKey>, usize) {
    let base = pda.num_states();
    let final_state = base + header.len();
    let mut keys = Vec::new();
    let mut add_edges = |from: usize, n: usize, keys: &mut Vec<TransKey>| {
        if header.accepting(n) {
            keys.push(TransKey { from, label: Some(pda.bottom()), to: final_state });
        }
        for edge in header.edges(n) {
            for label in edge_label_ids(pda, edge) {
                for &n2 in header.closure(edge.to) {
                    keys.push(TransKey { from, label: Some(label), to: base + n2 });
                }
            }
        }
    };
    for n in 0..header.len() {
        add_edges(base + n, n, &mut keys);
    }
    for &p in anchors {
        for &n0 in header.initial_closure() {
            add_edges(p, n0, &mut keys);
        }
    }
    (keys, final_state)
}

/// Saturate the automaton of initial configurations with the `post*` rules.
fn saturate_post(pda: &Pda, prestack: &Nfa<Label>) -> (Automaton, usize) {
    let components = pda.rules().iter().map(|r| r.weight.len()).max().unwrap_or(0);
    let zero = vec![0u32; components];

    let mut rules_by_from_pre: HashMap<(usize, LabelId), Vec<usize>> = HashMap::new();
    for (rid, rule) in pda.rules().iter().enumerate() {
        rules_by_from_pre.entry((rule.from, rule.pre)).or_default().push(rid);
    }

    let (origins, final_state) = start_transitions(pda, prestack, pda.initial());
    let mut aut = Automaton::default();
    let mut heap: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();
    let mut seq = 0usize;
    let mut push = |heap: &mut BinaryHeap<Reverse<Pending>>,
                    seq: &mut usize,
                    key: TransKey,
                    weight: Vec<u32>,
                    prov: Prov| {
        heap.push(Reverse(Pending { weight, seq: *seq, key, prov }));
        *seq += 1;
    };
    for key in origins {
        push(&mut heap, &mut seq, key, zero.clone(), Prov::Origin);
    }

    // one fresh state per (state, label) target of a push rule
    let mut push_states: HashMap<(usize, LabelId), usize> = HashMap::new();
    let mut next_state = final_state + 1;

    while let Some(Reverse(pending)) = heap.pop() {
        if aut.contains(&pending.key) {
            continue;
        }
        let weight = pending.weight.clone();
        let id = aut.insert(pending.key, pending.weight, pending.prov);
        let key = pending.key;
        match key.label {
            Some(gamma) => {
                // combine with ε-transitions ending in the source state
                for eid in aut.eps_by_to.get(&key.from).cloned().unwrap_or_default() {
                    let eps_weight = aut.trans[eid].weight.clone();
                    push(
                        &mut heap,
                        &mut seq,
                        TransKey { from: aut.trans[eid].key.from, label: Some(gamma), to: key.to },
                        add_weights(&eps_weight, &weight),
                        Prov::Combine { eps: eid, tail: id },
                    );
                }
                // apply all rules reading gamma in the source state
                if key.from < pda.num_states() {
                    for rid in rules_by_from_pre.get(&(key.from, gamma)).cloned().unwrap_or_default()
                    {
                        let rule = &pda.rules()[rid];
                        let rw = add_weights(&weight, &rule.weight);
                        match rule.op {
                            Op::Pop => push(
                                &mut heap,
                                &mut seq,
                                TransKey { from: rule.to, label: None, to: key.to },
                                rw,
                                Prov::PopEps { rule: rid, prev: id },
                            ),
                            Op::Swap(l) => push(
                                &mut heap,
                                &mut seq,
                                TransKey { from: rule.to, label: Some(l), to: key.to },
                                rw,
                                Prov::Swap { rule: rid, prev: id },
                            ),
                            Op::Push(l) => {
                                let mid = *push_states.entry((rule.to, l)).or_insert_with(|| {
                                    let s = next_state;
                                    next_state += 1;
                                    s
                                });
                                push(
                                    &mut heap,
                                    &mut seq,
                                    TransKey { from: rule.to, label: Some(l), to: mid },
                                    zero.clone(),
                                    Prov::PushHead,
                                );
                                push(
                                    &mut heap,
                                    &mut seq,
                                    TransKey { from: mid, label: Some(gamma), to: key.to },
                                    rw,
                                    Prov::PushTail { rule: rid, prev: id },
                                );
                            }
                        }
                    }
                }
            }
            None => {
                // new ε-transition: combine with everything leaving its target
                for tid in aut.noneps_by_from.get(&key.to).cloned().unwrap_or_default() {
                    let t = aut.trans[tid].clone();
                    push(
                        &mut heap,
                        &mut seq,
                        TransKey { from: key.from, label: t.key.label, to: t.key.to },
                        add_weights(&weight, &t.weight),
                        Prov::Combine { eps: id, tail: tid },
                    );
                }
            }
        }
    }
    (aut, final_state)
}

/// Saturate the automaton of accepting configurations with the `pre*` rules.
fn saturate_pre(pda: &Pda, poststack: &Nfa<Label>) -> (Automaton, usize) {
    let mut swap_rhs: HashMap<(usize, LabelId), Vec<usize>> = HashMap::new();
    let mut push_rhs: HashMap<(usize, LabelId), Vec<usize>> = HashMap::new();
    let mut pop_rules: Vec<usize> = Vec::new();
    for (rid, rule) in pda.rules().iter().enumerate() {
        match rule.op {
            Op::Pop => pop_rules.push(rid),
            Op::Swap(l) => swap_rhs.entry((rule.to, l)).or_default().push(rid),
            Op::Push(l) => push_rhs.entry((rule.to, l)).or_default().push(rid),
        }
    }

    let (origins, final_state) = start_transitions(pda, poststack, pda.accepting());
    let mut aut = Automaton::default();
    let mut heap: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();
    let mut seq = 0usize;
    let mut push = |heap: &mut BinaryHeap<Reverse<Pending>>,
                    seq: &mut usize,
                    key: TransKey,
                    prov: Prov| {
        heap.push(Reverse(Pending { weight: Vec::new(), seq: *seq, key, prov }));
        *seq += 1;
    };
    for key in origins {
        push(&mut heap, &mut seq, key, Prov::Origin);
    }
    for &rid in pop_rules.iter() {
        let rule = &pda.rules()[rid];
        push(
            &mut heap,
            &mut seq,
            TransKey { from: rule.from, label: Some(rule.pre), to: rule.to },
            Prov::Apply { rule: rid, path: [0, 0], path_len: 0 },
        );
    }

    // push rules waiting for the second transition of their right-hand side
    let mut pending_push: HashMap<(usize, LabelId), Vec<(usize, usize)>> = HashMap::new();

    while let Some(Reverse(pending)) = heap.pop() {
        if aut.contains(&pending.key) {
            continue;
        }
        let id = aut.insert(pending.key, pending.weight, pending.prov);
        let key = pending.key;
        let gamma = key.label.expect("pre* does not produce ε-transitions");

        for rid in swap_rhs.get(&(key.from, gamma)).cloned().unwrap_or_default() {
            let rule = &pda.rules()[rid];
            push(
                &mut heap,
                &mut seq,
                TransKey { from: rule.from, label: Some(rule.pre), to: key.to },
                Prov::Apply { rule: rid, path: [id, 0], path_len: 1 },
            );
        }
        for rid in push_rhs.get(&(key.from, gamma)).cloned().unwrap_or_default() {
            let rule = &pda.rules()[rid];
            let second = rule.pre;
            for tid in aut.by_from_label.get(&(key.to, second)).cloned().unwrap_or_default() {
                let to = aut.trans[tid].key.to;
                push(
                    &mut heap,
                    &mut seq,
                    TransKey { from: rule.from, label: Some(rule.pre), to },
                    Prov::Apply { rule: rid, path: [id, tid], path_len: 2 },
                );
            }
            pending_push.entry((key.to, second)).or_default().push((rid, id));
        }
        for (rid, first) in pending_push.get(&(key.from, gamma)).cloned().unwrap_or_default() {
            let rule = &pda.rules()[rid];
            push(
                &mut heap,
                &mut seq,
                TransKey { from: rule.from, label: Some(rule.pre), to: key.to },
                Prov::Apply { rule: rid, path: [first, id], path_len: 2 },
            );
        }
    }
    (aut, final_state)
}

/// Search the saturated automaton for an accepted configuration
/// `(p, w·⊥)` with `p` an anchor and `w` in the header language. Returns the
/// anchor, the accepting run and its total weight, minimizing the weight.
fn find_accepted_config(
    pda: &Pda,
    aut: &Automaton,
    final_state: usize,
    header: &Nfa<Label>,
    anchors: &[usize],
) -> Option<(usize, Vec<usize>, Vec<u32>)> {
    type Node = (usize, usize);
    let components = aut.trans.iter().map(|t| t.weight.len()).max().unwrap_or(0);
    let zero = vec![0u32; components];
    let mut dist: HashMap<Node, Vec<u32>> = HashMap::new();
    let mut prev: HashMap<Node, (Node, usize)> = HashMap::new();
    let mut visited: std::collections::HashSet<Node> = std::collections::HashSet::new();
    let mut heap: BinaryHeap<Reverse<(Vec<u32>, usize, Node)>> = BinaryHeap::new();
    let mut seq = 0usize;

    for &p in anchors {
        for &n in header.initial_closure() {
            let node = (p, n);
            if !dist.contains_key(&node) {
                dist.insert(node, zero.clone());
                heap.push(Reverse((zero.clone(), seq, node)));
                seq += 1;
            }
        }
    }

    while let Some(Reverse((d, _, node))) = heap.pop() {
        if !visited.insert(node) {
            continue;
        }
        let (a, n) = node;
        if header.accepting(n) {
            if let Some(&bid) =
                aut.index.get(&TransKey { from: a, label: Some(pda.bottom()), to: final_state })
            {
                // first accepted node popped: minimal by Dijkstra order
                let mut run = vec![bid];
                let mut cur = node;
                while let Some((p_node, tid)) = prev.get(&cur) {
                    run.push(*tid);
                    cur = *p_node;
                }
                run.reverse();
                let total = add_weights(&d, &aut.trans[bid].weight);
                return Some((cur.0, run, total));
            }
        }
        for tid in aut.noneps_by_from.get(&a).cloned().unwrap_or_default() {
            let t = &aut.trans[tid];
            let label = t.key.label.unwrap();
            if label == pda.bottom() {
                continue;
            }
            let symbol = pda.label(label);
            for edge in header.edges(n) {
                if !edge.contains(&symbol) {
                    continue;
                }
                for &n2 in header.closure(edge.to) {
                    let node2 = (t.key.to, n2);
                    let nd = add_weights(&d, &t.weight);
                    if dist.get(&node2).map_or(true, |old| nd < *old) {
                        dist.insert(node2, nd.clone());
                        prev.insert(node2, (node, tid));
                        heap.push(Reverse((nd, seq, node2)));
                        seq += 1;
                    }
                }
            }
        }
    }
    None
}

/// Forward reachability: does some initial configuration reach an accepting
/// one? On success the witness can be turned into a trace.
pub fn post_star(
    pda: &Pda,
    prestack: &Nfa<Label>,
    poststack: &Nfa<Label>,
) -> (bool, Option<Witness>) {
    let (reachable, witness) = post_star_shortest(pda, prestack, poststack);
    (reachable, witness.map(|(w, _)| w))
}

/// Forward reachability returning the witness of minimal weight together
/// with that weight.
pub fn post_star_shortest(
    pda: &Pda,
    prestack: &Nfa<Label>,
    poststack: &Nfa<Label>,
) -> (bool, Option<(Witness, Vec<u32>)>) {
    let (aut, final_state) = saturate_post(pda, prestack);
    match find_accepted_config(pda, &aut, final_state, poststack, pda.accepting()) {
        Some((state, run, weight)) => {
            let witness = Witness { backward: false, trans: aut.trans, run, state };
            (true, Some((witness, weight)))
        }
        None => (false, None),
    }
}

/// Backward reachability: saturates from the accepting configurations and
/// checks whether an initial configuration is covered. The witness trace is
/// reported in forward order.
pub fn pre_star(
    pda: &Pda,
    prestack: &Nfa<Label>,
    poststack: &Nfa<Label>,
    return_trace: bool,
) -> (bool, Option<Witness>) {
    let (aut, final_state) = saturate_pre(pda, poststack);
    match find_accepted_config(pda, &aut, final_state, prestack, pda.initial()) {
        Some((state, run, _)) => {
            let witness = if return_trace {
                Some(Witness { backward: true, trans: aut.trans, run, state })
            } else {
                None
            };
            (true, witness)
        }
        None => (false, None),
    }
}

/// Rebuild the abstract trace from a witness, in forward execution order.
pub fn get_trace(pda: &Pda, witness: Witness) -> Vec<TraceState> {
    let configs =
        if witness.backward { trace_pre(pda, witness) } else { trace_post(pda, witness) };
    configs
        .into_iter()
        .map(|(state, stack)| TraceState {
            state,
            stack: stack.into_iter().map(|l| pda.label(l)).collect(),
        })
        .collect()
}

fn run_stack(trans: &[Trans], run: &[usize]) -> Vec<LabelId> {
    run.iter().map(|t| trans[*t].key.label.expect("runs contain no ε-transitions")).collect()
}

/// Walk a `post*` witness backwards from the accepted configuration to an
/// initial one, then report the configurations in forward order.
fn trace_post(pda: &Pda, witness: Witness) -> Vec<(usize, Vec<LabelId>)> {
    let trans = &witness.trans;
    let mut run = witness.run;
    let mut state = witness.state;
    let mut stack = run_stack(trans, &run);
    let mut configs = Vec::new();
    loop {
        configs.push((state, stack.clone()));
        match trans[run[0]].prov {
            Prov::Origin => break,
            Prov::Swap { rule, prev } => {
                let r = &pda.rules()[rule];
                state = r.from;
                stack[0] = r.pre;
                run[0] = prev;
            }
            Prov::PushHead => {
                // the next transition leaves the push state and knows the rule
                match trans[run[1]].prov {
                    Prov::PushTail { rule, prev } => {
                        let r = &pda.rules()[rule];
                        state = r.from;
                        stack.drain(0..2);
                        stack.insert(0, r.pre);
                        run.drain(0..2);
                        run.insert(0, prev);
                    }
                    _ => unreachable!("push head without matching tail"),
                }
            }
            Prov::Combine { eps, tail } => match trans[eps].prov {
                Prov::PopEps { rule, prev } => {
                    let r = &pda.rules()[rule];
                    state = r.from;
                    stack.insert(0, r.pre);
                    run[0] = tail;
                    run.insert(0, prev);
                }
                _ => unreachable!("ε-transitions are only produced by pop rules"),
            },
            Prov::PopEps { .. } | Prov::PushTail { .. } | Prov::Apply { .. } => {
                unreachable!("invalid provenance at the head of a run")
            }
        }
    }
    configs.reverse();
    configs
}

/// Walk a `pre*` witness forward from the initial configuration to an
/// accepting one.
fn trace_pre(pda: &Pda, witness: Witness) -> Vec<(usize, Vec<LabelId>)> {
    let trans = &witness.trans;
    let mut run = witness.run;
    let mut state = witness.state;
    let mut stack = run_stack(trans, &run);
    let mut configs = vec![(state, stack.clone())];
    loop {
        match trans[run[0]].prov {
            Prov::Origin => break,
            Prov::Apply { rule, path, path_len } => {
                let r = &pda.rules()[rule];
                state = r.to;
                match r.op {
                    Op::Pop => {
                        stack.remove(0);
                        run.remove(0);
                    }
                    Op::Swap(l) => {
                        stack[0] = l;
                        run[0] = path[0];
                        debug_assert_eq!(path_len, 1);
                    }
                    Op::Push(l) => {
                        stack.insert(0, l);
                        run[0] = path[1];
                        run.insert(0, path[0]);
                        debug_assert_eq!(path_len, 2);
                    }
                }
                configs.push((state, stack.clone()));
            }
            _ => unreachable!("pre* witnesses only contain backward applications"),
        }
    }
    configs
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pda::StackOp;

    fn header(labels: &[Label]) -> Nfa<Label> {
        let mut nfa = labels
            .iter()
            .map(|l| Nfa::literal(vec![*l], false))
            .fold(None, |acc: Option<Nfa<Label>>, next| match acc {
                Some(nfa) => Some(nfa.concat(next)),
                None => Some(next),
            })
            .unwrap_or_else(Nfa::epsilon);
        nfa.finalize();
        nfa
    }

    fn l(n: u64) -> Label {
        Label::Mpls(n)
    }

    /// 0 --swap b--> 1 --swap c--> 2
    fn swap_chain() -> Pda {
        let mut pda = Pda::new(vec![l(1), l(2), l(3)]);
        pda.set_num_states(3);
        pda.add_rule(0, Some(l(1)), StackOp::Swap(l(2)), 1, vec![]);
        pda.add_rule(1, Some(l(2)), StackOp::Swap(l(3)), 2, vec![]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![2]);
        pda
    }

    #[test]
    fn test_post_star_swap_chain() {
        let pda = swap_chain();
        let (reachable, witness) = post_star(&pda, &header(&[l(1)]), &header(&[l(3)]));
        assert!(reachable);
        let trace = get_trace(&pda, witness.unwrap());
        assert_eq!(
            trace,
            vec![
                TraceState { state: 0, stack: vec![l(1), Label::Bottom] },
                TraceState { state: 1, stack: vec![l(2), Label::Bottom] },
                TraceState { state: 2, stack: vec![l(3), Label::Bottom] },
            ]
        );
        // the same query must fail when the final header does not match
        let (reachable, _) = post_star(&pda, &header(&[l(1)]), &header(&[l(2)]));
        assert!(!reachable);
    }

    #[test]
    fn test_pre_star_swap_chain() {
        let pda = swap_chain();
        let (reachable, witness) = pre_star(&pda, &header(&[l(1)]), &header(&[l(3)]), true);
        assert!(reachable);
        let trace = get_trace(&pda, witness.unwrap());
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0], TraceState { state: 0, stack: vec![l(1), Label::Bottom] });
        assert_eq!(trace[2], TraceState { state: 2, stack: vec![l(3), Label::Bottom] });
        let (reachable, _) = pre_star(&pda, &header(&[l(2)]), &header(&[l(3)]), false);
        assert!(!reachable);
    }

    /// 0 --push b--> 1 --swap c--> 2 --pop--> 3 (revealing the original a)
    fn push_pop_chain() -> Pda {
        let mut pda = Pda::new(vec![l(1), l(2), l(3)]);
        pda.set_num_states(4);
        pda.add_rule(0, Some(l(1)), StackOp::Push(l(2)), 1, vec![]);
        pda.add_rule(1, Some(l(2)), StackOp::Swap(l(3)), 2, vec![]);
        pda.add_rule(2, Some(l(3)), StackOp::Pop, 3, vec![]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![3]);
        pda
    }

    #[test]
    fn test_post_star_push_pop() {
        let pda = push_pop_chain();
        let (reachable, witness) = post_star(&pda, &header(&[l(1)]), &header(&[l(1)]));
        assert!(reachable);
        let trace = get_trace(&pda, witness.unwrap());
        assert_eq!(
            trace,
            vec![
                TraceState { state: 0, stack: vec![l(1), Label::Bottom] },
                TraceState { state: 1, stack: vec![l(2), l(1), Label::Bottom] },
                TraceState { state: 2, stack: vec![l(3), l(1), Label::Bottom] },
                TraceState { state: 3, stack: vec![l(1), Label::Bottom] },
            ]
        );
    }

    #[test]
    fn test_pre_star_push_pop() {
        let pda = push_pop_chain();
        let (reachable, witness) = pre_star(&pda, &header(&[l(1)]), &header(&[l(1)]), true);
        assert!(reachable);
        let trace = get_trace(&pda, witness.unwrap());
        assert_eq!(trace.len(), 4);
        assert_eq!(trace[1].stack, vec![l(2), l(1), Label::Bottom]);
    }

    #[test]
    fn test_wildcard_rules() {
        // a wildcard identity rule forwards any label unchanged
        let mut pda = Pda::new(vec![l(1), l(2), l(3)]);
        pda.set_num_states(2);
        pda.add_rule(0, None, StackOp::Noop, 1, vec![]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![1]);
        let (reachable, witness) = post_star(&pda, &header(&[l(2)]), &header(&[l(2)]));
        assert!(reachable);
        let trace = get_trace(&pda, witness.unwrap());
        assert_eq!(trace[1], TraceState { state: 1, stack: vec![l(2), Label::Bottom] });
        // the identity keeps the label, so a different final header fails
        let (reachable, _) = post_star(&pda, &header(&[l(2)]), &header(&[l(3)]));
        assert!(!reachable);
    }

    #[test]
    fn test_shortest_trace() {
        // two routes from 0 to 3: a direct swap of weight [5] and a detour
        // of total weight [3]
        let mut pda = Pda::new(vec![l(1), l(2), l(3)]);
        pda.set_num_states(4);
        pda.add_rule(0, Some(l(1)), StackOp::Swap(l(3)), 3, vec![5]);
        pda.add_rule(0, Some(l(1)), StackOp::Swap(l(2)), 1, vec![1]);
        pda.add_rule(1, Some(l(2)), StackOp::Swap(l(2)), 2, vec![1]);
        pda.add_rule(2, Some(l(2)), StackOp::Swap(l(3)), 3, vec![1]);
        pda.set_initial(vec![0]);
        pda.set_accepting(vec![3]);
        let (reachable, witness) = post_star_shortest(&pda, &header(&[l(1)]), &header(&[l(3)]));
        assert!(reachable);
        let (witness, weight) = witness.unwrap();
        assert_eq!(weight, vec![3]);
        let trace = get_trace(&pda, witness);
        assert_eq!(trace.len(), 4);
    }

    #[test]
    fn test_unreachable_when_no_rule_matches() {
        let pda = swap_chain();
        let (reachable, _) = post_star(&pda, &header(&[l(3)]), &header(&[l(3)]));
        assert!(!reachable);
        let (reachable, _) = pre_star(&pda, &header(&[l(3)]), &header(&[l(3)]), true);
        assert!(!reachable);
    }
}
