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

//! # Route synthesis
//!
//! Two construction routines over an existing network: [`make_reroute`]
//! computes a label-switched bypass around a failed interface, and
//! [`make_data_flow`] installs a labelled flow along an explicit router
//! path.

use crate::model::{Action, Interface, InterfaceId, Label, Network, RouterId};
use log::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Synthesize a bypass around the failed interface `failed` using the fresh
/// label `failover_label`: a cheapest path (under `cost`) from the source
/// router of `failed` to its target router that does not use `failed`.
///
/// Along the bypass, the packet travels in a tunnel on `failover_label`:
/// every ingress table of the protecting router receives backup rules that
/// append a push of the label and redirect over the first bypass edge,
/// intermediate hops swap the label onto itself, and the hop over the last
/// edge pops it, delivering the packet to the target router with the header
/// it would have carried over `failed`.
///
/// Returns false if no bypass of at least two edges exists. Ties between
/// equal-cost candidates are broken by the interface global id, so the
/// synthesized route is deterministic.
pub fn make_reroute<F>(
    network: &mut Network,
    failed: InterfaceId,
    failover_label: Label,
    cost: F,
) -> bool
where
    F: Fn(&Interface) -> u32,
{
    let source_router = network.interface(failed).router();
    let target_router = network.target_router(failed);

    // back-pointers of the search tree
    let mut tree: Vec<(InterfaceId, Option<usize>)> = Vec::new();
    let mut seen: HashSet<RouterId> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<(u32, InterfaceId, Option<usize>)>> = BinaryHeap::new();

    for interface in network.router(source_router).interfaces() {
        if interface.global_id() != failed {
            queue.push(Reverse((0, interface.global_id(), None)));
        }
    }
    seen.insert(source_router);

    while let Some(Reverse((priority, interface, back))) = queue.pop() {
        if network.target_router(interface) == target_router {
            let last = match back {
                Some(last) => last,
                // a parallel link is not a tunnel; keep searching
                None => continue,
            };
            // POP over the last edge of the bypass
            let pop_at = network.pair_of(tree[last].0);
            network
                .interface_mut(pop_at)
                .table_mut()
                .add_rule(failover_label, vec![Action::Pop], interface);
            // SWAP at each intermediate hop
            let mut via = tree[last].0;
            let mut current = tree[last].1;
            while let Some(idx) = current {
                let swap_at = network.pair_of(tree[idx].0);
                network.interface_mut(swap_at).table_mut().add_rule(
                    failover_label,
                    vec![Action::Swap(failover_label)],
                    via,
                );
                via = tree[idx].0;
                current = tree[idx].1;
            }
            // PUSH via backup rules on every other ingress of the source
            let ingresses: Vec<InterfaceId> = network
                .router(source_router)
                .interfaces()
                .iter()
                .filter(|i| i.global_id() != failed)
                .map(|i| i.global_id())
                .collect();
            for ingress in ingresses {
                network
                    .interface_mut(ingress)
                    .table_mut()
                    .add_failover_entries(failed, via, failover_label);
            }
            debug!("synthesized a bypass of cost {} around {}", priority, failed);
            return true;
        }
        let next_router = network.target_router(interface);
        if !seen.insert(next_router) {
            continue;
        }
        tree.push((interface, back));
        let idx = tree.len() - 1;
        for next in network.router(next_router).interfaces() {
            if next.global_id() == failed {
                continue;
            }
            if seen.contains(&network.target_router(next.global_id())) {
                continue;
            }
            queue.push(Reverse((priority + cost(next), next.global_id(), Some(idx))));
        }
    }
    false
}

/// Install a flow along the router path `path`: packets entering `from` with
/// `pre_label` on top are tunnelled on `flow_label` and leave the last
/// router via `to`. Returns false if `from`/`to` do not sit on the first and
/// last router, or two consecutive routers of the path are not adjacent.
pub fn make_data_flow(
    network: &mut Network,
    from: InterfaceId,
    to: InterfaceId,
    pre_label: Label,
    flow_label: Label,
    path: &[RouterId],
) -> bool {
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return false,
    };
    if network.interface(from).router() != first || network.interface(to).router() != last {
        return false;
    }
    if path.len() == 1 {
        // degenerate flow through a single router
        network.interface_mut(from).table_mut().add_rule(pre_label, vec![], to);
        return true;
    }

    let mut edges: Vec<InterfaceId> = Vec::new();
    for pair in path.windows(2) {
        match find_edge(network, pair[0], pair[1]) {
            Some(edge) => edges.push(edge),
            None => {
                debug!("routers {} and {} are not adjacent", pair[0], pair[1]);
                return false;
            }
        }
    }

    // PUSH at the ingress
    network
        .interface_mut(from)
        .table_mut()
        .add_rule(pre_label, vec![Action::Push(flow_label)], edges[0]);
    // SWAP at the intermediate hops
    for i in 1..edges.len() {
        let at = network.pair_of(edges[i - 1]);
        network
            .interface_mut(at)
            .table_mut()
            .add_rule(flow_label, vec![Action::Swap(flow_label)], edges[i]);
    }
    // POP at the egress
    let at = network.pair_of(edges[edges.len() - 1]);
    network.interface_mut(at).table_mut().add_rule(flow_label, vec![Action::Pop], to);
    true
}

/// The cheapest-id interface of `from` whose link ends at `to`.
fn find_edge(network: &Network, from: RouterId, to: RouterId) -> Option<InterfaceId> {
    network
        .router(from)
        .interfaces()
        .iter()
        .filter(|i| network.target_router(i.global_id()) == to)
        .map(|i| i.global_id())
        .min()
}
