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

//! Module defining routers and their interfaces.

use crate::model::{InterfaceId, ModelError, RouterId, RoutingTable};
use std::collections::HashMap;

/// A geographic coordinate, as found in topology datasets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// One end of a link, owned by exactly one router. The interface carries the
/// routing table that applies to packets arriving on it.
#[derive(Debug, Clone)]
pub struct Interface {
    pub(crate) id: usize,
    pub(crate) global_id: InterfaceId,
    pub(crate) router: RouterId,
    pub(crate) names: Vec<String>,
    pub(crate) table: RoutingTable,
    pub(crate) pair: Option<InterfaceId>,
    pub(crate) is_virtual: bool,
}

impl Interface {
    /// The id of the interface, unique within its router.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The id of the interface, unique across the whole network.
    pub fn global_id(&self) -> InterfaceId {
        self.global_id
    }

    /// The router owning this interface.
    pub fn router(&self) -> RouterId {
        self.router
    }

    /// The primary name of the interface.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// All names of the interface.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The routing table applied to packets arriving on this interface.
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Mutable access to the routing table.
    pub fn table_mut(&mut self) -> &mut RoutingTable {
        &mut self.table
    }

    /// The interface at the other end of the link, if paired.
    pub fn pair(&self) -> Option<InterfaceId> {
        self.pair
    }

    /// Virtual interfaces connect a router to itself and do not consume a
    /// path step when the packet traverses them.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }
}

/// A router of the network, owning its interfaces.
#[derive(Debug, Clone)]
pub struct Router {
    pub(crate) id: RouterId,
    pub(crate) names: Vec<String>,
    pub(crate) coordinate: Option<Coordinate>,
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) interface_names: HashMap<String, usize>,
    pub(crate) is_null: bool,
}

impl Router {
    pub(crate) fn new(
        id: RouterId,
        names: Vec<String>,
        coordinate: Option<Coordinate>,
        is_null: bool,
    ) -> Self {
        Self { id, names, coordinate, interfaces: Vec::new(), interface_names: HashMap::new(), is_null }
    }

    /// The index of the router.
    pub fn id(&self) -> RouterId {
        self.id
    }

    /// The primary name of the router.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// All names of the router.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if `name` is one of the router's names.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The geographic location of the router, if known.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    /// Returns true for the null router, which adopts every interface that
    /// points outside the modelled network.
    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// All interfaces owned by this router.
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Find an interface by any of its names.
    pub fn find_interface(&self, name: &str) -> Option<&Interface> {
        self.interface_names.get(name).map(|idx| &self.interfaces[*idx])
    }

    pub(crate) fn add_interface(
        &mut self,
        names: Vec<String>,
        global_id: InterfaceId,
    ) -> Result<usize, ModelError> {
        let id = self.interfaces.len();
        for name in names.iter() {
            if self.interface_names.contains_key(name) {
                return Err(ModelError::DuplicateInterfaceName(name.clone(), self.name().to_string()));
            }
        }
        for name in names.iter() {
            self.interface_names.insert(name.clone(), id);
        }
        self.interfaces.push(Interface {
            id,
            global_id,
            router: self.id,
            names,
            table: RoutingTable::new(),
            pair: None,
            is_virtual: false,
        });
        Ok(id)
    }
}
