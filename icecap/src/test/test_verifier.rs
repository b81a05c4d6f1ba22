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
use crate::model::{Action::*, Label, Network};
use crate::query::{parse_query, NetworkWeight};
use crate::verifier::Verifier;
use serde_json::json;

fn l(n: u64) -> Label {
    Label::Mpls(n)
}

/// Two routers in a line. The ingress of R0 swaps 42 to 43 and forwards to
/// R1, which pops and delivers.
fn line_network() -> Network {
    let mut net = Network::make_network(&["R0", "R1"], &[&["iR0", "R1"], &["R0", "iR1"]]);
    let ir0 = interface(&net, "R0", "iR0");
    let r0_to_r1 = interface(&net, "R0", "R1");
    let r1_from_r0 = interface(&net, "R1", "R0");
    let ir1 = interface(&net, "R1", "iR1");
    install(&mut net, ir0, l(42), 0, r0_to_r1, vec![Swap(l(43))]);
    install(&mut net, r1_from_r0, l(43), 0, ir1, vec![Pop]);
    net
}

#[test]
fn test_trivial_reachability() {
    let _ = pretty_env_logger::try_init();
    let net = line_network();
    let query = parse_query(&net, "<. .> [.#R0] [R0#R1] [R1#.] <.> 0 OVER").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(true));
    assert_eq!(result["mode"], json!("OVER"));
    let trace = &result["trace"];
    assert!(!trace.as_array().unwrap().is_empty());
    assert_eq!(count_rule_steps(trace), 2);
    assert_eq!(count_link_steps(trace), 3);
}

#[test]
fn test_both_engines_agree() {
    let net = line_network();
    let query = parse_query(&net, "<. .> [.#R0] [R0#R1] [R1#.] <.> 0 OVER").unwrap();
    let post = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    let pre = Verifier::new(2, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(post["result"], pre["result"]);
    assert_eq!(count_rule_steps(&pre["trace"]), 2);
    // a header that cannot leave R0 is rejected by both
    let query = parse_query(&net, "<43 .> [.#R0] [R0#R1] [R1#.] <.> 0 OVER").unwrap();
    assert_eq!(Verifier::new(1, 0).run_once(&net, &query, None).unwrap()["result"], json!(false));
    assert_eq!(Verifier::new(2, 0).run_once(&net, &query, None).unwrap()["result"], json!(false));
}

#[test]
fn test_reduction_preserves_the_verdict() {
    let net = line_network();
    let query = parse_query(&net, "<. .> [.#R0] [R0#R1] [R1#.] <.> 0 OVER").unwrap();
    let plain = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    let reduced = Verifier::new(1, 1).run_once(&net, &query, None).unwrap();
    assert_eq!(plain["result"], reduced["result"]);
    assert_eq!(plain["reduction"], json!([0, 0]));
    let removed = reduced["reduction"].as_array().unwrap();
    assert!(removed[0].as_u64().is_some() && removed[1].as_u64().is_some());
}

/// Two disconnected routers: a DUAL query with k = 0 is decided by the
/// over-approximation alone.
#[test]
fn test_no_path_when_disconnected() {
    let net = Network::make_network(&["S", "T"], &[&["iS"], &["iT"]]);
    let query = parse_query(&net, "<.> [.#S] .* [.#T] <.> 0 DUAL").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(false));
    assert_eq!(result["mode"], json!("OVER"));
    assert!(result.get("trace").is_none());
}

/// Two candidate routes of two and three hops; the hop-weighted search must
/// report the two-hop route.
#[test]
fn test_weighted_shortest_trace() {
    let mut net = Network::make_network(
        &["S", "A", "B", "C", "T"],
        &[&["iS", "A", "B"], &["S", "T"], &["S", "C"], &["B", "T"], &["A", "C", "iT"]],
    );
    let is = interface(&net, "S", "iS");
    let s_to_a = interface(&net, "S", "A");
    let s_to_b = interface(&net, "S", "B");
    let a_from_s = interface(&net, "A", "S");
    let a_to_t = interface(&net, "A", "T");
    let b_from_s = interface(&net, "B", "S");
    let b_to_c = interface(&net, "B", "C");
    let c_from_b = interface(&net, "C", "B");
    let c_to_t = interface(&net, "C", "T");
    install(&mut net, is, l(5), 0, s_to_a, vec![Swap(l(6))]);
    install(&mut net, is, l(5), 0, s_to_b, vec![Swap(l(7))]);
    install(&mut net, a_from_s, l(6), 0, a_to_t, vec![Swap(l(8))]);
    install(&mut net, b_from_s, l(7), 0, b_to_c, vec![Swap(l(7))]);
    install(&mut net, c_from_b, l(7), 0, c_to_t, vec![Swap(l(8))]);

    let weight = NetworkWeight::parse_str(r#"[[{"factor": 1, "atom": "hops"}]]"#).unwrap();
    let query = parse_query(&net, "<5> [.#S] .* [.#T] <8> 0 OVER").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, Some(&weight)).unwrap();
    assert_eq!(result["result"], json!(true));
    assert_eq!(result["trace-weight"], json!([2]));
    assert_eq!(count_rule_steps(&result["trace"]), 2);
}

/// The only abstract route to T activates a backup rule whose three
/// higher-priority siblings would all have to fail, exceeding k = 1. The
/// over-approximation finds the trace but cannot concretize it, and the
/// under-approximation never builds it.
#[test]
fn test_spurious_trace_is_maybe() {
    let _ = pretty_env_logger::try_init();
    let mut net = Network::make_network(
        &["S", "M", "T"],
        &[&["iS", "M"], &["S", "x1", "x2", "x3", "T"], &["M", "iT"]],
    );
    let is = interface(&net, "S", "iS");
    let s_to_m = interface(&net, "S", "M");
    let m_from_s = interface(&net, "M", "S");
    let m_to_t = interface(&net, "M", "T");
    install(&mut net, is, l(5), 0, s_to_m, vec![]);
    for stub in &["x1", "x2", "x3"] {
        let via = interface(&net, "M", stub);
        install(&mut net, m_from_s, l(5), 0, via, vec![]);
    }
    install(&mut net, m_from_s, l(5), 1, m_to_t, vec![]);

    let query = parse_query(&net, "<5> [.#S] .* [.#T] <5> 1 DUAL").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(null));
    assert_eq!(result["mode"], json!("DUAL"));
    assert!(result.get("trace").is_none());
}

/// A short route that is inconsistent under failure accounting (it must use
/// the link towards N and later assume the same link failed) hides a longer
/// consistent route. The hop-weighted over-approximation deterministically
/// returns the short spurious trace and stays inconclusive; the
/// under-approximation tracks the failure assumptions in the state and
/// reports the consistent route.
#[test]
fn test_dual_falls_back_to_under() {
    let _ = pretty_env_logger::try_init();
    let mut net = Network::make_network(
        &["S", "M", "N", "C", "D", "E", "F", "T"],
        &[
            &["iS", "M", "C"],
            &["S", "N", "T"],
            &["M"],
            &["S", "D"],
            &["C", "E"],
            &["D", "F"],
            &["E", "T"],
            &["M", "F", "iT"],
        ],
    );
    let is = interface(&net, "S", "iS");
    let s_to_m = interface(&net, "S", "M");
    let s_to_c = interface(&net, "S", "C");
    let m_from_s = interface(&net, "M", "S");
    let m_to_n = interface(&net, "M", "N");
    let m_to_t = interface(&net, "M", "T");
    let n_from_m = interface(&net, "N", "M");
    let c_from_s = interface(&net, "C", "S");
    let c_to_d = interface(&net, "C", "D");
    let d_from_c = interface(&net, "D", "C");
    let d_to_e = interface(&net, "D", "E");
    let e_from_d = interface(&net, "E", "D");
    let e_to_f = interface(&net, "E", "F");
    let f_from_e = interface(&net, "F", "E");
    let f_to_t = interface(&net, "F", "T");

    // short route: S -> M -> N -> M -> T, where the last hop needs the link
    // M -> N to fail even though the packet already used it
    install(&mut net, is, l(10), 0, s_to_m, vec![Swap(l(11))]);
    install(&mut net, m_from_s, l(11), 0, m_to_n, vec![Swap(l(12))]);
    // hairpin back towards M
    install(&mut net, n_from_m, l(12), 0, n_from_m, vec![Swap(l(13))]);
    // the preferred rule dead-ends in N, the backup needs M -> N failed
    install(&mut net, m_to_n, l(13), 0, m_to_n, vec![Swap(l(99))]);
    install(&mut net, m_to_n, l(13), 1, m_to_t, vec![Swap(l(20))]);
    // long route: S -> C -> D -> E -> F -> T, all preferred rules
    install(&mut net, is, l(10), 0, s_to_c, vec![Swap(l(21))]);
    install(&mut net, c_from_s, l(21), 0, c_to_d, vec![Swap(l(22))]);
    install(&mut net, d_from_c, l(22), 0, d_to_e, vec![Swap(l(23))]);
    install(&mut net, e_from_d, l(23), 0, e_to_f, vec![Swap(l(24))]);
    install(&mut net, f_from_e, l(24), 0, f_to_t, vec![Swap(l(20))]);

    let weight = NetworkWeight::parse_str(r#"[[{"factor": 1, "atom": "hops"}]]"#).unwrap();
    let query = parse_query(&net, "<10> [.#S] .* [.#T] <20> 1 DUAL").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, Some(&weight)).unwrap();
    assert_eq!(result["result"], json!(true));
    assert_eq!(result["mode"], json!("UNDER"));
    assert_eq!(result["trace-weight"], json!([5]));
    assert_eq!(count_rule_steps(&result["trace"]), 5);
}

#[test]
fn test_exact_mode() {
    let net = line_network();
    // with no failures the verdict is exact and reported without a trace
    let query = parse_query(&net, "<. .> [.#R0] [R0#R1] [R1#.] <.> 0 EXACT").unwrap();
    let result = Verifier::new(1, 0).run_once(&net, &query, None).unwrap();
    assert_eq!(result["result"], json!(true));
    assert!(result.get("trace").is_none());
    // with failures, tracing an EXACT query is unsupported
    let query = parse_query(&net, "<. .> [.#R0] [R0#R1] [R1#.] <.> 1 EXACT").unwrap();
    assert!(Verifier::new(1, 0).run_once(&net, &query, None).is_err());
}
