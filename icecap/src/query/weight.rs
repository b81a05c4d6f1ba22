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

//! Module defining the weight expressions used to rank traces.
//!
//! The JSON syntax is an array of arrays, in order of priority:
//!
//! ```text
//! [ [ {"factor": NUM, "atom": ATOM}, ... ], ... ]
//! ```
//!
//! where `ATOM` is one of `hops`, `failures`, `tunnel_depth` and `latency`.
//! Each outer element contributes one component of a lexicographically
//! ordered weight vector; each inner element adds `factor` times the atom's
//! value for the forwarding rule under consideration.

use crate::error::Error;
use crate::model::{Action, ForwardingRule, InterfaceId, Network};
use serde::Deserialize;
use std::collections::HashMap;

/// An atomic property of a forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightAtom {
    /// 1 when this is the last operation of the rule and the outgoing
    /// interface is not virtual, 0 otherwise.
    Hops,
    /// The priority of the rule, a lower bound on the failures required to
    /// activate it.
    Failures,
    /// The number of push operations of the rule.
    TunnelDepth,
    /// The configured latency of the outgoing interface, charged on the last
    /// operation only.
    Latency,
}

#[derive(Debug, Deserialize)]
struct AtomSpec {
    factor: u32,
    atom: String,
}

/// A lexicographically ordered weight function over forwarding rules.
#[derive(Debug, Clone, Default)]
pub struct NetworkWeight {
    components: Vec<Vec<(u32, WeightAtom)>>,
    latency: HashMap<InterfaceId, u32>,
}

impl NetworkWeight {
    /// Parse the weight expression from its JSON form.
    pub fn parse(json: &serde_json::Value) -> Result<Self, Error> {
        let spec: Vec<Vec<AtomSpec>> = serde_json::from_value(json.clone())
            .map_err(|e| Error::InputParse(format!("weight expression: {}", e)))?;
        let mut components = Vec::with_capacity(spec.len());
        for inner in spec {
            let mut component = Vec::with_capacity(inner.len());
            for entry in inner {
                let atom = match entry.atom.as_str() {
                    "hops" => WeightAtom::Hops,
                    "failures" => WeightAtom::Failures,
                    "tunnel_depth" => WeightAtom::TunnelDepth,
                    "latency" => WeightAtom::Latency,
                    other => {
                        return Err(Error::InputParse(format!(
                            "unknown atomic property \"{}\"",
                            other
                        )))
                    }
                };
                component.push((entry.factor, atom));
            }
            components.push(component);
        }
        Ok(Self { components, latency: HashMap::new() })
    }

    /// Parse the weight expression from a JSON string.
    pub fn parse_str(s: &str) -> Result<Self, Error> {
        let json: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::InputParse(e.to_string()))?;
        Self::parse(&json)
    }

    /// Attach an interface latency map, used by the `latency` atom.
    pub fn with_latency(mut self, latency: HashMap<InterfaceId, u32>) -> Self {
        self.latency = latency;
        self
    }

    /// The number of lexicographic components.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// The all-zero weight vector.
    pub fn zero(&self) -> Vec<u32> {
        vec![0; self.components.len()]
    }

    /// Evaluate the weight of one forwarding rule. `last_op` tells whether
    /// this evaluation accounts for the final operation of the rule, so that
    /// per-traversal atoms are charged exactly once.
    pub fn evaluate(&self, network: &Network, rule: &ForwardingRule, last_op: bool) -> Vec<u32> {
        self.components
            .iter()
            .map(|component| {
                component
                    .iter()
                    .map(|(factor, atom)| factor * self.atom_value(network, rule, last_op, *atom))
                    .sum()
            })
            .collect()
    }

    fn atom_value(
        &self,
        network: &Network,
        rule: &ForwardingRule,
        last_op: bool,
        atom: WeightAtom,
    ) -> u32 {
        match atom {
            WeightAtom::Hops => {
                if last_op && !network.interface(rule.via).is_virtual() {
                    1
                } else {
                    0
                }
            }
            WeightAtom::Failures => rule.priority,
            WeightAtom::TunnelDepth => {
                rule.ops.iter().filter(|op| matches!(op, Action::Push(_))).count() as u32
            }
            WeightAtom::Latency => {
                if last_op {
                    self.latency.get(&rule.via).copied().unwrap_or(0)
                } else {
                    0
                }
            }
        }
    }
}
