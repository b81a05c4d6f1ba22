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

//! Module containing the basic type definitions of the network model.

use thiserror::Error;

/// Router identification (index into the network's router vector)
pub type RouterId = usize;

/// Global interface identification (index into the network's interface index,
/// unique across all routers)
pub type InterfaceId = usize;

/// Errors raised while building or mutating a network model.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A router name was declared twice
    #[error("Duplicate definition of router \"{0}\"")]
    DuplicateRouterName(String),
    /// An interface name was declared twice on the same router
    #[error("Duplicate definition of interface \"{0}\" for router \"{1}\"")]
    DuplicateInterfaceName(String, String),
    /// A router name could not be resolved
    #[error("Router \"{0}\" was not found in the network")]
    RouterNotFound(String),
    /// An interface name could not be resolved on the given router
    #[error("Interface \"{0}\" was not found on router \"{1}\"")]
    InterfaceNotFound(String, String),
    /// A link endpoint is already paired with a different interface
    #[error("Link endpoint \"{0}\" is already paired with \"{1}\"")]
    PairingMismatch(String, String),
    /// A label string could not be interpreted
    #[error("Cannot parse label \"{0}\"")]
    UnknownLabel(String),
    /// Two routers are not adjacent
    #[error("Network link does not exist: {0} -> {1}")]
    RoutersNotConnected(String, String),
}
