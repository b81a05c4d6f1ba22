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

//! Parses GML files from Topology Zoo.

use crate::model::Coordinate;
use petgraph::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

/// The data attached to every parsed GML node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// The node label, deduplicated with a `_N` suffix when it occurs twice.
    pub name: String,
    /// The node coordinate, if both `Latitude` and `Longitude` are present.
    pub coordinate: Option<Coordinate>,
}

/// Parse a GML document into an undirected graph. Duplicate edges are
/// ignored; duplicate labels get a `_N` suffix (starting from `_1` for the
/// second occurrence).
pub fn parse_gml(gml: &str) -> Result<Graph<NodeData, f64, Undirected, u32>, GmlError> {
    let mut graph: Graph<NodeData, f64, Undirected, u32> = Graph::new_undirected();

    let mut current_state = CurrentState::NotStarted;
    let mut used_labels: HashMap<String, usize> = HashMap::new();
    let mut node_lookup: HashMap<usize, NodeIndex<u32>> = HashMap::new();

    for (i, line) in gml.lines().enumerate() {
        let line = line.trim();
        current_state = match current_state {
            CurrentState::NotStarted => {
                if line == "graph [" {
                    CurrentState::None
                } else {
                    return Err(GmlError::UnexpectedToken { line: i, content: String::from(line) });
                }
            }
            CurrentState::None => {
                if line == "node [" {
                    CurrentState::Node { id: None, name: None, latitude: None, longitude: None }
                } else if line == "edge [" {
                    CurrentState::Edge { source: None, target: None }
                } else {
                    CurrentState::None
                }
            }
            CurrentState::Node { id, name, latitude, longitude } => {
                if let Some(number) = line.strip_prefix("id ") {
                    let id: Option<usize> = Some(number.parse()?);
                    CurrentState::Node { id, name, latitude, longitude }
                } else if line.starts_with("label ") {
                    let raw = line["label ".len()..].trim_matches('"');
                    let mut name = raw.replace(' ', "_");
                    let num_used = *used_labels.get(&name).unwrap_or(&0);
                    used_labels.insert(name.clone(), num_used + 1);
                    if num_used > 0 {
                        name.push_str(&format!("_{}", num_used));
                    }
                    CurrentState::Node { id, name: Some(name), latitude, longitude }
                } else if let Some(number) = line.strip_prefix("Latitude ") {
                    let latitude: Option<f64> = Some(number.parse()?);
                    CurrentState::Node { id, name, latitude, longitude }
                } else if let Some(number) = line.strip_prefix("Longitude ") {
                    let longitude: Option<f64> = Some(number.parse()?);
                    CurrentState::Node { id, name, latitude, longitude }
                } else if line == "]" {
                    let name = name.ok_or(GmlError::NodeMissingLabel(i))?;
                    let coordinate = match (latitude, longitude) {
                        (Some(latitude), Some(longitude)) => {
                            Some(Coordinate { latitude, longitude })
                        }
                        _ => None,
                    };
                    let node_idx = graph.add_node(NodeData { name, coordinate });
                    let id = id.ok_or(GmlError::NodeMissingId(i))?;
                    if node_lookup.contains_key(&id) {
                        return Err(GmlError::NodeIdNotUnique(i));
                    }
                    node_lookup.insert(id, node_idx);
                    CurrentState::None
                } else {
                    CurrentState::Node { id, name, latitude, longitude }
                }
            }
            CurrentState::Edge { source, target } => {
                if let Some(number) = line.strip_prefix("source ") {
                    let source: Option<usize> = Some(number.parse()?);
                    CurrentState::Edge { source, target }
                } else if let Some(number) = line.strip_prefix("target ") {
                    let target: Option<usize> = Some(number.parse()?);
                    CurrentState::Edge { source, target }
                } else if line == "]" {
                    let source = source.ok_or(GmlError::EdgeMissingSource(i))?;
                    let source_idx =
                        node_lookup.get(&source).ok_or(GmlError::UnknownNodeId(source))?;
                    let target = target.ok_or(GmlError::EdgeMissingTarget(i))?;
                    let target_idx =
                        node_lookup.get(&target).ok_or(GmlError::UnknownNodeId(target))?;
                    if source_idx != target_idx && !graph.contains_edge(*source_idx, *target_idx) {
                        graph.add_edge(*source_idx, *target_idx, 1.0);
                    }
                    CurrentState::None
                } else {
                    CurrentState::Edge { source, target }
                }
            }
        };
    }

    Ok(graph)
}

enum CurrentState {
    NotStarted,
    None,
    Node { id: Option<usize>, name: Option<String>, latitude: Option<f64>, longitude: Option<f64> },
    Edge { source: Option<usize>, target: Option<usize> },
}

/// Errors raised while parsing a GML document.
#[derive(Debug, Error)]
pub enum GmlError {
    /// Io Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// Unexpected token in the document
    #[error("Unexpected token in line {line}: {content}")]
    UnexpectedToken {
        /// zero-based line number
        line: usize,
        /// the offending line
        content: String,
    },
    /// A node block without an id
    #[error("Node without id, ending on line {0}")]
    NodeMissingId(usize),
    /// A node block without a label
    #[error("Node without label, ending on line {0}")]
    NodeMissingLabel(usize),
    /// Two node blocks share an id
    #[error("Node id is not unique, second definition ends on line {0}")]
    NodeIdNotUnique(usize),
    /// An edge block without a source
    #[error("Edge without source, ending on line {0}")]
    EdgeMissingSource(usize),
    /// An edge block without a target
    #[error("Edge without target, ending on line {0}")]
    EdgeMissingTarget(usize),
    /// An edge endpoint refers to an undefined node
    #[error("Unknown node id: {0}")]
    UnknownNodeId(usize),
    /// A numeric field does not parse as an integer
    #[error("Cannot parse integer: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),
    /// A numeric field does not parse as a float
    #[error("Cannot parse float: {0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),
}

#[cfg(test)]
mod test {
    use super::*;

    const SMALL_GML: &str = r#"graph [
  node [
    id 0
    label "Aalborg"
    Latitude 57.048
    Longitude 9.9187
  ]
  node [
    id 1
    label "Copenhagen"
  ]
  node [
    id 2
    label "Aalborg"
  ]
  edge [
    source 0
    target 1
  ]
  edge [
    source 1
    target 2
  ]
  edge [
    source 0
    target 1
  ]
]"#;

    #[test]
    fn test_parse_gml() {
        let graph = parse_gml(SMALL_GML).unwrap();
        assert_eq!(graph.node_count(), 3);
        // the duplicate edge is dropped
        assert_eq!(graph.edge_count(), 2);
        let names: Vec<&str> =
            graph.node_indices().map(|n| graph[n].name.as_str()).collect();
        assert_eq!(names, vec!["Aalborg", "Copenhagen", "Aalborg_1"]);
        assert!(graph[graph.node_indices().next().unwrap()].coordinate.is_some());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_gml("not a graph").is_err());
        let missing_label = "graph [\n node [\n id 0\n ]\n]";
        assert!(matches!(parse_gml(missing_label), Err(GmlError::NodeMissingLabel(_))));
    }
}
