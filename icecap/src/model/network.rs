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

//! Module defining the network: routers, the global interface index and the
//! name lookup. The network is immutable while a query is being verified;
//! mutation is only performed during construction and by the synthesis
//! routines.

use crate::model::{Coordinate, Interface, InterfaceId, Label, ModelError, Router, RouterId};
use itertools::Itertools;
use std::collections::HashMap;

/// Name of the router which adopts all interfaces that point outside the
/// modelled network.
pub const NULL_ROUTER_NAME: &str = "NULL";

/// The network model: routers owning interfaces, a global interface index,
/// and a name-to-router mapping.
#[derive(Debug, Clone)]
pub struct Network {
    name: String,
    routers: Vec<Router>,
    /// Global interface index: maps an [`InterfaceId`] to the owning router
    /// and the local index within that router.
    interfaces: Vec<(RouterId, usize)>,
    names: HashMap<String, RouterId>,
}

impl Network {
    /// Create an empty network.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), routers: Vec::new(), interfaces: Vec::new(), names: HashMap::new() }
    }

    /// The name of the network.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a router with the given names and optional location.
    pub fn add_router(
        &mut self,
        names: Vec<String>,
        coordinate: Option<Coordinate>,
    ) -> Result<RouterId, ModelError> {
        self.add_router_impl(names, coordinate, false)
    }

    fn add_router_impl(
        &mut self,
        names: Vec<String>,
        coordinate: Option<Coordinate>,
        is_null: bool,
    ) -> Result<RouterId, ModelError> {
        let id = self.routers.len();
        for name in names.iter() {
            if self.names.contains_key(name) {
                return Err(ModelError::DuplicateRouterName(name.clone()));
            }
        }
        for name in names.iter() {
            self.names.insert(name.clone(), id);
        }
        self.routers.push(Router::new(id, names, coordinate, is_null));
        Ok(id)
    }

    /// Get the interface with the given name on the given router, creating it
    /// if it does not yet exist.
    pub fn get_interface(&mut self, router: RouterId, name: impl Into<String>) -> InterfaceId {
        let name = name.into();
        if let Some(inf) = self.routers[router].find_interface(&name) {
            return inf.global_id();
        }
        let global_id = self.interfaces.len();
        // the name was just checked to be free
        let local = self.routers[router].add_interface(vec![name], global_id).unwrap();
        self.interfaces.push((router, local));
        global_id
    }

    /// Add an interface with several names to the given router.
    pub fn add_interface(
        &mut self,
        router: RouterId,
        names: Vec<String>,
    ) -> Result<InterfaceId, ModelError> {
        let global_id = self.interfaces.len();
        let local = self.routers[router].add_interface(names, global_id)?;
        self.interfaces.push((router, local));
        Ok(global_id)
    }

    /// Mark an interface as virtual. Virtual interfaces are self-paired and
    /// do not consume a path step.
    pub fn set_virtual(&mut self, interface: InterfaceId, is_virtual: bool) {
        self.interface_mut(interface).is_virtual = is_virtual;
    }

    /// Pair the two interfaces as the two ends of a bidirectional link. The
    /// operation is idempotent; re-pairing an interface with a different
    /// partner is an error.
    pub fn add_link(&mut self, a: InterfaceId, b: InterfaceId) -> Result<(), ModelError> {
        let pair_a = self.interface(a).pair();
        let pair_b = self.interface(b).pair();
        match (pair_a, pair_b) {
            (Some(pa), Some(pb)) if pa == b && pb == a => Ok(()),
            (None, None) => {
                self.interface_mut(a).pair = Some(b);
                self.interface_mut(b).pair = Some(a);
                Ok(())
            }
            _ => Err(ModelError::PairingMismatch(
                self.interface_full_name(a),
                self.interface_full_name(pair_a.or(pair_b).unwrap_or(a)),
            )),
        }
    }

    /// Adopt every unpaired non-virtual interface by pairing it with a fresh
    /// interface on the null router. After this call, [`Network::pair_of`] is
    /// total. Does nothing if no interface is unpaired.
    pub fn add_null_router(&mut self) {
        let unpaired: Vec<InterfaceId> = self
            .interfaces()
            .filter(|i| i.pair().is_none() && !i.is_virtual())
            .map(|i| i.global_id())
            .collect();
        if unpaired.is_empty() {
            return;
        }
        let null = match self.find_router(NULL_ROUTER_NAME) {
            Some(r) if self.routers[r].is_null() => r,
            _ => self.add_router_impl(vec![NULL_ROUTER_NAME.to_string()], None, true).unwrap(),
        };
        for ifc in unpaired {
            let mut name = self.interface(ifc).name().to_string();
            if self.routers[null].find_interface(&name).is_some() {
                name = self.interface_full_name(ifc);
            }
            let other = self.add_interface(null, vec![name]).unwrap();
            self.interface_mut(ifc).pair = Some(other);
            self.interface_mut(other).pair = Some(ifc);
        }
    }

    /// All routers of the network.
    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    /// The router with the given id.
    pub fn router(&self, id: RouterId) -> &Router {
        &self.routers[id]
    }

    /// Find a router by any of its names.
    pub fn find_router(&self, name: &str) -> Option<RouterId> {
        self.names.get(name).copied()
    }

    /// The number of interfaces in the global index.
    pub fn num_interfaces(&self) -> usize {
        self.interfaces.len()
    }

    /// The interface with the given global id.
    pub fn interface(&self, id: InterfaceId) -> &Interface {
        let (router, local) = self.interfaces[id];
        &self.routers[router].interfaces[local]
    }

    /// Mutable access to the interface with the given global id.
    pub fn interface_mut(&mut self, id: InterfaceId) -> &mut Interface {
        let (router, local) = self.interfaces[id];
        &mut self.routers[router].interfaces[local]
    }

    /// Iterate over all interfaces in global-id order.
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter().map(move |(r, l)| &self.routers[*r].interfaces[*l])
    }

    /// The other end of the link of the given interface. Virtual interfaces
    /// are their own partner.
    pub fn pair_of(&self, id: InterfaceId) -> InterfaceId {
        self.interface(id).pair().unwrap_or(id)
    }

    /// The router at the other end of the link of the given interface.
    pub fn target_router(&self, id: InterfaceId) -> RouterId {
        self.interface(self.pair_of(id)).router()
    }

    /// The interface name qualified with its router name.
    pub fn interface_full_name(&self, id: InterfaceId) -> String {
        let inf = self.interface(id);
        format!("{}.{}", self.router(inf.router()).name(), inf.name())
    }

    /// Every concrete label appearing in a routing table, sorted and
    /// deduplicated. Wildcard top-labels are not part of the alphabet.
    pub fn all_labels(&self) -> Vec<Label> {
        self.interfaces()
            .flat_map(|i| i.table().entries())
            .flat_map(|e| {
                std::iter::once(e.top_label)
                    .chain(e.rules.iter().flat_map(|r| r.ops.iter().filter_map(|op| op.label())))
            })
            .filter(|l| !l.is_wildcard() && !l.is_bottom())
            .sorted()
            .dedup()
            .collect()
    }

    /// Construct a network from router names and per-router neighbor lists.
    /// Every entry of `links[i]` creates an interface on router `i` carrying
    /// the entry as its name; entries naming another router are paired with
    /// the corresponding reverse interface, all others are adopted by the
    /// null router. Useful for tests and synthesis experiments.
    pub fn make_network(names: &[&str], links: &[&[&str]]) -> Network {
        let mut net = Network::new("network");
        for name in names {
            net.add_router(vec![name.to_string()], None).unwrap();
        }
        for (i, neighbors) in links.iter().enumerate() {
            for other in neighbors.iter() {
                net.get_interface(i, *other);
            }
        }
        for (i, neighbors) in links.iter().enumerate() {
            for other in neighbors.iter() {
                if let Some(j) = net.find_router(other) {
                    let a = net.get_interface(i, *other);
                    let b = net.get_interface(j, names[i]);
                    net.add_link(a, b).unwrap();
                }
            }
        }
        net.add_null_router();
        net
    }
}
