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

//! Helpers shared by the end-to-end tests.

use crate::model::{Action, ForwardingRule, InterfaceId, Label, Network};

/// The global id of the interface `name` on router `router`.
pub fn interface(net: &Network, router: &str, name: &str) -> InterfaceId {
    let router_id = net.find_router(router).expect("router exists");
    net.router(router_id).find_interface(name).expect("interface exists").global_id()
}

/// Install a forwarding rule on the routing table of the given interface.
pub fn install(
    net: &mut Network,
    at: InterfaceId,
    label: Label,
    priority: u32,
    via: InterfaceId,
    ops: Vec<Action>,
) {
    net.interface_mut(at)
        .table_mut()
        .insert_rule(label, ForwardingRule { priority, weight: 0, via, ops });
}

/// Count the rule applications in a trace value.
pub fn count_rule_steps(trace: &serde_json::Value) -> usize {
    trace.as_array().unwrap().iter().filter(|step| step.get("rule").is_some()).count()
}

/// Count the link traversals in a trace value.
pub fn count_link_steps(trace: &serde_json::Value) -> usize {
    trace.as_array().unwrap().iter().filter(|step| step.get("from_router").is_some()).count()
}
