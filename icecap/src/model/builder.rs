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

//! Parsing and serializing the JSON network format.
//!
//! The document is an object `{"network": {"name", "routers", "links"}}`.
//! Routers carry `name` or `names`, an optional `location` and their
//! `interfaces`; each interface maps label strings to arrays of forwarding
//! rules `{"out", "priority", "ops", "weight"?}` where each operation is a
//! single-key object (`{"pop": ""}`, `{"push": LABEL}`, `{"swap": LABEL}`).
//! Links pair interfaces of two routers; an `out` interface that was never
//! declared refers to the peer of a link installed later and is created on
//! the fly.

use crate::error::Error;
use crate::model::factory::rule_to_json;
use crate::model::{
    Action, Coordinate, ForwardingRule, InterfaceId, Label, Network, RouterId,
};
use serde_json::{json, Map, Value};

fn field<'a>(value: &'a Value, key: &str, context: &str) -> Result<&'a Value, Error> {
    value
        .get(key)
        .ok_or_else(|| Error::InputParse(format!("missing field \"{}\" in {}", key, context)))
}

fn as_str<'a>(value: &'a Value, context: &str) -> Result<&'a str, Error> {
    value.as_str().ok_or_else(|| Error::InputParse(format!("{} is not a string", context)))
}

fn as_array<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>, Error> {
    value.as_array().ok_or_else(|| Error::InputParse(format!("{} is not an array", context)))
}

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>, Error> {
    value.as_object().ok_or_else(|| Error::InputParse(format!("{} is not an object", context)))
}

/// The `name` or `names` field as a non-empty list of names.
fn names_of(value: &Value, context: &str) -> Result<Vec<String>, Error> {
    let names = match (value.get("name"), value.get("names")) {
        (Some(name), _) => vec![as_str(name, context)?.to_string()],
        (None, Some(names)) => as_array(names, context)?
            .iter()
            .map(|n| as_str(n, context).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        (None, None) => {
            return Err(Error::InputParse(format!("{} has neither name nor names", context)))
        }
    };
    if names.is_empty() {
        return Err(Error::InputParse(format!("{} must have at least one name", context)));
    }
    Ok(names)
}

fn parse_label(s: &str) -> Result<Label, Error> {
    Label::parse(s).map_err(Error::Model)
}

fn parse_action(value: &Value) -> Result<Action, Error> {
    let object = as_object(value, "operation")?;
    if object.len() != 1 {
        return Err(Error::InputParse(
            "operation object must contain exactly one property".to_string(),
        ));
    }
    let (op, label) = object.iter().next().unwrap();
    match op.as_str() {
        "pop" => Ok(Action::Pop),
        "swap" => Ok(Action::Swap(parse_label(as_str(label, "swap label")?)?)),
        "push" => Ok(Action::Push(parse_label(as_str(label, "push label")?)?)),
        other => Err(Error::InputParse(format!("unknown operation \"{}\"", other))),
    }
}

/// Parse a network from its JSON document.
pub fn network_from_json(json: &Value) -> Result<Network, Error> {
    let json_network = field(json, "network", "document root")?;
    let name = as_str(field(json_network, "name", "network")?, "network name")?;
    let mut network = Network::new(name);

    let json_routers = as_array(field(json_network, "routers", "network")?, "routers field")?;
    for json_router in json_routers {
        let names = names_of(json_router, "router")?;
        let coordinate = match json_router.get("location") {
            Some(location) => Some(parse_coordinate(location)?),
            None => None,
        };
        let router = network.add_router(names, coordinate)?;

        let json_interfaces =
            as_array(field(json_router, "interfaces", "router")?, "interfaces field")?;
        // create all declared interfaces before resolving routing tables
        for json_interface in json_interfaces {
            let names = names_of(json_interface, "interface")?;
            network.add_interface(router, names)?;
        }
        for json_interface in json_interfaces {
            let names = names_of(json_interface, "interface")?;
            let interface = network
                .router(router)
                .find_interface(&names[0])
                .map(|i| i.global_id())
                .expect("interface was created above");
            parse_routing_table(&mut network, router, interface, json_interface)?;
        }
    }

    let json_links = as_array(field(json_network, "links", "network")?, "links field")?;
    for json_link in json_links {
        let from = resolve_endpoint(&network, json_link, "from_router", "from_interface")?;
        let to = resolve_endpoint(&network, json_link, "to_router", "to_interface")?;
        network.add_link(from, to)?;
    }
    network.add_null_router();
    Ok(network)
}

/// Parse a network from a JSON string.
pub fn network_from_str(s: &str) -> Result<Network, Error> {
    let json: Value = serde_json::from_str(s).map_err(|e| Error::InputParse(e.to_string()))?;
    network_from_json(&json)
}

fn parse_coordinate(value: &Value) -> Result<Coordinate, Error> {
    let latitude = field(value, "latitude", "location")?
        .as_f64()
        .ok_or_else(|| Error::InputParse("latitude is not a number".to_string()))?;
    let longitude = field(value, "longitude", "location")?
        .as_f64()
        .ok_or_else(|| Error::InputParse("longitude is not a number".to_string()))?;
    Ok(Coordinate { latitude, longitude })
}

fn parse_routing_table(
    network: &mut Network,
    router: RouterId,
    interface: InterfaceId,
    json_interface: &Value,
) -> Result<(), Error> {
    let table = as_object(
        field(json_interface, "routing_table", "interface")?,
        "routing_table field",
    )?;
    for (label_string, json_rules) in table {
        let top_label = parse_label(label_string)?;
        let json_rules = as_array(json_rules, "routing table entry")?;
        let mut rules: Vec<ForwardingRule> = Vec::new();
        for json_rule in json_rules {
            let out = as_str(field(json_rule, "out", "rule")?, "out field")?.to_string();
            let priority = field(json_rule, "priority", "rule")?
                .as_u64()
                .ok_or_else(|| Error::InputParse("priority is not an integer".to_string()))?;
            let weight = match json_rule.get("weight") {
                Some(w) => w
                    .as_u64()
                    .ok_or_else(|| Error::InputParse("weight is not an integer".to_string()))?,
                None => 0,
            };
            let ops = as_array(field(json_rule, "ops", "rule")?, "ops field")?
                .iter()
                .map(parse_action)
                .collect::<Result<Vec<_>, _>>()?;
            // an unknown out-interface refers to a link installed later
            let via = network.get_interface(router, out);
            rules.push(ForwardingRule { priority: priority as u32, weight: weight as u32, via, ops });
        }
        let table = network.interface_mut(interface).table_mut();
        for rule in rules {
            table.insert_rule(top_label, rule);
        }
    }
    Ok(())
}

fn resolve_endpoint(
    network: &Network,
    json_link: &Value,
    router_key: &str,
    interface_key: &str,
) -> Result<InterfaceId, Error> {
    let router_name = as_str(field(json_link, router_key, "link")?, router_key)?;
    let interface_name = as_str(field(json_link, interface_key, "link")?, interface_key)?;
    let router = network
        .find_router(router_name)
        .ok_or_else(|| crate::model::ModelError::RouterNotFound(router_name.to_string()))?;
    let interface = network
        .router(router)
        .find_interface(interface_name)
        .map(|i| i.global_id())
        .ok_or_else(|| {
            crate::model::ModelError::InterfaceNotFound(
                interface_name.to_string(),
                router_name.to_string(),
            )
        })?;
    Ok(interface)
}

/// Serialize a network back to its JSON document. The null router and its
/// pairings are omitted; every link is written once with the endpoint of the
/// smaller global id first.
pub fn network_to_json(network: &Network) -> Value {
    let mut routers = Vec::new();
    for router in network.routers() {
        if router.is_null() {
            continue;
        }
        let interfaces: Vec<Value> = router
            .interfaces()
            .iter()
            .map(|interface| {
                let mut table = Map::new();
                for entry in interface.table().entries() {
                    let rules: Vec<Value> =
                        entry.rules.iter().map(|r| rule_to_json(network, r)).collect();
                    table.insert(entry.top_label.to_string(), Value::Array(rules));
                }
                json!({
                    "name": interface.name(),
                    "routing_table": Value::Object(table),
                })
            })
            .collect();
        let mut value = json!({
            "names": router.names(),
            "interfaces": interfaces,
        });
        if let Some(coordinate) = router.coordinate() {
            value["location"] =
                json!({ "latitude": coordinate.latitude, "longitude": coordinate.longitude });
        }
        routers.push(value);
    }

    let mut links = Vec::new();
    for interface in network.interfaces() {
        let pair = match interface.pair() {
            Some(pair) => pair,
            None => continue,
        };
        if interface.global_id() > pair {
            continue;
        }
        let peer = network.interface(pair);
        if network.router(interface.router()).is_null() || network.router(peer.router()).is_null()
        {
            continue;
        }
        links.push(json!({
            "from_router": network.router(interface.router()).name(),
            "from_interface": interface.name(),
            "to_router": network.router(peer.router()).name(),
            "to_interface": peer.name(),
            "bidirectional": true,
        }));
    }

    json!({
        "network": {
            "name": network.name(),
            "routers": routers,
            "links": links,
        }
    })
}
