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

//! # Topology import
//!
//! Builds a network from a [Topology Zoo](http://www.topology-zoo.org)
//! GML file: one router per node, one interface pair per edge, interfaces
//! named after the neighboring router. The generated network carries no
//! routing tables; install them with the [`crate::synthesis`] routines or
//! programmatically.

pub mod gml_parser;

pub use gml_parser::{parse_gml, GmlError, NodeData};

use crate::error::Error;
use crate::model::Network;
use petgraph::prelude::*;
use std::fs::read_to_string;

/// Build a network from a parsed topology graph.
pub fn network_from_graph(
    name: impl Into<String>,
    graph: &Graph<NodeData, f64, Undirected, u32>,
) -> Result<Network, Error> {
    let mut network = Network::new(name);
    let mut router_of = Vec::with_capacity(graph.node_count());
    for node in graph.node_indices() {
        let data = &graph[node];
        router_of.push(network.add_router(vec![data.name.clone()], data.coordinate)?);
    }
    for edge in graph.edge_indices() {
        let (a, b) = graph.edge_endpoints(edge).expect("edge of the same graph");
        let router_a = router_of[a.index()];
        let router_b = router_of[b.index()];
        let ifc_a = network.get_interface(router_a, graph[b].name.clone());
        let ifc_b = network.get_interface(router_b, graph[a].name.clone());
        network.add_link(ifc_a, ifc_b)?;
    }
    network.add_null_router();
    Ok(network)
}

/// Read and parse a GML file and build the network, named after the file.
pub fn network_from_gml_file(path: &str) -> Result<Network, Error> {
    let content = read_to_string(path).map_err(|e| Error::Gml(GmlError::IoError(e)))?;
    let graph = parse_gml(&content)?;
    let name = path.rsplit('/').next().unwrap_or(path).trim_end_matches(".gml");
    network_from_graph(name, &graph)
}
