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

//! # Network model
//!
//! Routers, interfaces, label-matching routing tables and their translation
//! into pushdown automata. The main structure is the [`Network`]; it can be
//! built programmatically, parsed from its JSON form ([`builder`]) or
//! generated from a GML topology ([`crate::topology`]).

pub mod builder;
mod edge_status;
pub mod factory;
mod label;
mod network;
mod router;
mod routing_table;
pub(crate) mod types;

pub use edge_status::EdgeStatus;
pub use label::Label;
pub use network::{Network, NULL_ROUTER_NAME};
pub use router::{Coordinate, Interface, Router};
pub use routing_table::{Action, ForwardingRule, RoutingTable, TableEntry};
pub use types::{InterfaceId, ModelError, RouterId};
