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

#![deny(missing_docs)]

//! # Icecap: Verifying MPLS Networks under Link Failures
//!
//! This is a library for verifying reachability and policy properties of
//! MPLS-style label-switched networks under link-failure assumptions.
//!
//! ## Problem Statement
//!
//! Given
//! - a network of routers with label-matching routing tables on their
//!   interfaces,
//! - a query consisting of a regex over the initial header, a regex over the
//!   traversed links, a regex over the final header, and a failure bound k,
//!
//! decide whether there exists a packet header and an execution path through
//! the network, under at most k simultaneously failed links, such that the
//! path matches the link regex and the header matches both header regexes.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`model`]**: The network model: [`Label`](model::Label)s,
//!   [`RoutingTable`](model::RoutingTable)s, [`Router`](model::Router)s and
//!   the [`Network`](model::Network), together with the JSON builder
//!   ([`model::builder`]), the failure tracker
//!   ([`EdgeStatus`](model::EdgeStatus)), and the translation of a network
//!   and a query into a pushdown automaton
//!   ([`NetworkPdaFactory`](model::factory::NetworkPdaFactory)), including
//!   the mapping of abstract traces back to concrete routing decisions.
//!
//! - **[`query`]**: The query language: ε-NFAs over labels and over links
//!   ([`Nfa`](query::Nfa)), the query parser ([`query::parse_query`]), and
//!   the weight expressions ([`NetworkWeight`](query::NetworkWeight)) used
//!   to rank traces.
//!
//! - **[`pda`]**: The solving backend: the pushdown automaton
//!   ([`Pda`](pda::Pda)), the `post*`/`pre*` reachability procedures with
//!   witness traces ([`pda::solver`]), and the structural reducer
//!   ([`pda::reducer`]).
//!
//! - **[`verifier`]**: The driver running the approximation ladder: an
//!   over-approximation is conclusive on NO, an under-approximation on YES,
//!   and a DUAL query composes both into a decision procedure with a
//!   possible MAYBE outcome.
//!
//! - **[`synthesis`]**: Route construction: fast-reroute bypasses around a
//!   failed interface and explicit data flows.
//!
//! - **[`topology`]**: Import of Topology Zoo GML files.
//!
//! ## Usage
//!
//! ```
//! use icecap::model::builder::network_from_str;
//! use icecap::query::parse_query;
//! use icecap::verifier::Verifier;
//! use icecap::Error;
//!
//! fn main() -> Result<(), Error> {
//!     let network = network_from_str(r#"{ "network": {
//!         "name": "tiny",
//!         "routers": [
//!             { "name": "R0", "interfaces": [
//!                 { "name": "in", "routing_table": {
//!                     "42": [ { "out": "out", "priority": 0, "ops": [] } ]
//!                 } },
//!                 { "name": "out", "routing_table": {} }
//!             ] }
//!         ],
//!         "links": []
//!     } }"#)?;
//!
//!     let query = parse_query(&network, "<42> [.#R0] [R0#.] <42> 0 OVER")?;
//!     let result = Verifier::new(1, 0).run_once(&network, &query, None)?;
//!     assert_eq!(result["result"], serde_json::json!(true));
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;
pub mod pda;
pub mod query;
pub mod synthesis;
pub mod topology;
pub mod utils;
pub mod verifier;

mod test;

pub use error::Error;
