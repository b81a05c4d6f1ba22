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

use super::common::*;
use crate::model::{Action, Action::*, Label, Network};
use crate::query::parse_query;
use crate::synthesis::{make_data_flow, make_reroute};
use crate::verifier::Verifier;
use serde_json::json;

fn l(n: u64) -> Label {
    Label::Mpls(n)
}

/// The six-router diamond: a primary path R1 -> R2 -> R5 -> R6 and an
/// alternate route R2 -> R3 -> R4 -> R5 around the protected link.
fn diamond() -> Network {
    let mut net = Network::make_network(
        &["Router1", "Router2", "Router3", "Router4", "Router5", "Router6"],
        &[
            &["iRouter1", "Router2"],
            &["Router1", "Router3", "Router5"],
            &["Router2", "Router4"],
            &["Router3", "Router5"],
            &["Router2", "Router4", "Router6"],
            &["Router5", "iRouter6"],
        ],
    );
    let ir1 = interface(&net, "Router1", "iRouter1");
    let r1_to_r2 = interface(&net, "Router1", "Router2");
    let r2_from_r1 = interface(&net, "Router2", "Router1");
    let r2_to_r5 = interface(&net, "Router2", "Router5");
    let r5_from_r2 = interface(&net, "Router5", "Router2");
    let r5_from_r4 = interface(&net, "Router5", "Router4");
    let r5_to_r6 = interface(&net, "Router5", "Router6");
    // primary path carrying 1 -> 2 -> 3; Router5 forwards label 2 towards
    // Router6 regardless of the ingress
    install(&mut net, ir1, l(1), 0, r1_to_r2, vec![]);
    install(&mut net, r2_from_r1, l(1), 0, r2_to_r5, vec![Swap(l(2))]);
    install(&mut net, r5_from_r2, l(2), 0, r5_to_r6, vec![Swap(l(3))]);
    install(&mut net, r5_from_r4, l(2), 0, r5_to_r6, vec![Swap(l(3))]);
    net
}

#[test]
fn test_fast_reroute_diamond() {
    let _ = pretty_env_logger::try_init();
    let mut net = diamond();
    let failed = interface(&net, "Router2", "Router5");
    assert!(make_reroute(&mut net, failed, l(42), |_| 1));

    // POP over the last edge of the bypass, at Router4 coming from Router3
    let r4_from_r3 = interface(&net, "Router4", "Router3");
    let r4_to_r5 = interface(&net, "Router4", "Router5");
    let pop_entry = net
        .interface(r4_from_r3)
        .table()
        .entries_matching(l(42))
        .first()
        .copied()
        .cloned()
        .expect("pop rule installed");
    assert_eq!(pop_entry.rules[0].via, r4_to_r5);
    assert_eq!(pop_entry.rules[0].ops, vec![Action::Pop]);

    // SWAP at the intermediate hop, at Router3 coming from Router2
    let r3_from_r2 = interface(&net, "Router3", "Router2");
    let r3_to_r4 = interface(&net, "Router3", "Router4");
    let swap_entry = net
        .interface(r3_from_r2)
        .table()
        .entries_matching(l(42))
        .first()
        .copied()
        .cloned()
        .expect("swap rule installed");
    assert_eq!(swap_entry.rules[0].via, r3_to_r4);
    assert_eq!(swap_entry.rules[0].ops, vec![Action::Swap(l(42))]);

    // backup entry at Router2: one priority below the protected rule,
    // applying the original rewrite and entering the tunnel
    let r2_from_r1 = interface(&net, "Router2", "Router1");
    let r2_to_r3 = interface(&net, "Router2", "Router3");
    let entry = net
        .interface(r2_from_r1)
        .table()
        .entries_matching(l(1))
        .first()
        .copied()
        .cloned()
        .unwrap();
    assert_eq!(entry.rules.len(), 2);
    assert_eq!(entry.rules[1].priority, 1);
    assert_eq!(entry.rules[1].via, r2_to_r3);
    assert_eq!(entry.rules[1].ops, vec![Action::Swap(l(2)), Action::Push(l(42))]);

    // with Router2 -> Router5 failed, label 1 still reaches Router6 over the
    // alternate route
    let query = parse_query(
        &net,
        "<1> [.#Router1] [Router1#Router2] ([^Router2#Router5])* [Router5#Router6] <3> 1 DUAL",
    )
    .unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(true));
    let trace = &result["trace"];
    // ingress, Router1 -> Router2, three bypass hops, Router5 -> Router6
    assert_eq!(count_link_steps(trace), 6);
    assert_eq!(count_rule_steps(trace), 5);
}

#[test]
fn test_reroute_needs_an_alternative() {
    // only one route from A to B: protecting it must fail
    let mut net = Network::make_network(&["A", "B"], &[&["iA", "B"], &["A", "iB"]]);
    let failed = interface(&net, "A", "B");
    assert!(!make_reroute(&mut net, failed, l(42), |_| 1));
}

#[test]
fn test_data_flow_along_path() {
    let mut net = diamond();
    let ir1 = interface(&net, "Router1", "iRouter1");
    let ir6 = interface(&net, "Router6", "iRouter6");
    let path: Vec<usize> = ["Router1", "Router2", "Router5", "Router6"]
        .iter()
        .map(|name| net.find_router(name).unwrap())
        .collect();
    assert!(make_data_flow(&mut net, ir1, ir6, Label::AnyIp, l(123), &path));

    // push at the ingress
    let push_entry = net
        .interface(ir1)
        .table()
        .entries_matching(Label::AnyIp)
        .first()
        .copied()
        .cloned()
        .unwrap();
    assert_eq!(push_entry.rules[0].ops, vec![Action::Push(l(123))]);
    // pop at the egress
    let r6_from_r5 = interface(&net, "Router6", "Router5");
    let pop_entry = net
        .interface(r6_from_r5)
        .table()
        .entries_matching(l(123))
        .first()
        .copied()
        .cloned()
        .unwrap();
    assert_eq!(pop_entry.rules[0].via, ir6);
    assert_eq!(pop_entry.rules[0].ops, vec![Action::Pop]);

    // the flow carries an IP packet end to end
    let query =
        parse_query(&net, "<ip> [.#Router1] .* [Router6#.] <ip> 0 OVER").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(true));
}

#[test]
fn test_data_flow_single_router() {
    let mut net = Network::make_network(&["A"], &[&["iA", "oA"]]);
    let ia = interface(&net, "A", "iA");
    let oa = interface(&net, "A", "oA");
    let path = vec![net.find_router("A").unwrap()];
    assert!(make_data_flow(&mut net, ia, oa, Label::AnyIp, l(123), &path));
    let entry = net
        .interface(ia)
        .table()
        .entries_matching(Label::AnyIp)
        .first()
        .copied()
        .cloned()
        .unwrap();
    assert_eq!(entry.rules[0].via, oa);
    assert!(entry.rules[0].ops.is_empty());
}

#[test]
fn test_data_flow_rejects_broken_paths() {
    let mut net = diamond();
    let ir1 = interface(&net, "Router1", "iRouter1");
    let ir6 = interface(&net, "Router6", "iRouter6");
    // Router1 and Router6 are not adjacent
    let path: Vec<usize> = ["Router1", "Router6"]
        .iter()
        .map(|name| net.find_router(name).unwrap())
        .collect();
    assert!(!make_data_flow(&mut net, ir1, ir6, Label::AnyIp, l(123), &path));
    // the egress must sit on the last router
    let path: Vec<usize> = ["Router1", "Router2"]
        .iter()
        .map(|name| net.find_router(name).unwrap())
        .collect();
    assert!(!make_data_flow(&mut net, ir1, ir6, Label::AnyIp, l(123), &path));
}
