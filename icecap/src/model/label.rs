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

//! Module defining the packet header labels.

use crate::model::ModelError;
use std::fmt;

/// A single label of the packet header stack.
///
/// The ordering is total and follows the declaration order of the variants,
/// with the wildcard sorting last. Routing-table entries rely on this to keep
/// the "ignores label" entry at the end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// Marks the bottom of the header stack. This sentinel is maintained by
    /// the verification engine and is never pushed or swapped by any rule.
    Bottom,
    /// Any IP header (the payload below the MPLS stack).
    AnyIp,
    /// A concrete MPLS label.
    Mpls(u64),
    /// An interface label, as produced by tunnel encodings.
    Interface(u64),
    /// Matches every label. Only valid as the top-label of a routing-table
    /// entry, where it means "ignore the label".
    Wildcard,
}

impl Label {
    /// Parse a label from its string form: a plain integer is an MPLS label,
    /// `iN` is an interface label, `ip` is the any-IP label, and `any` or
    /// `null` denote the wildcard.
    pub fn parse(s: &str) -> Result<Label, ModelError> {
        match s {
            "ip" => Ok(Label::AnyIp),
            "any" | "null" => Ok(Label::Wildcard),
            _ => {
                if let Some(rest) = s.strip_prefix('i') {
                    if let Ok(n) = rest.parse::<u64>() {
                        return Ok(Label::Interface(n));
                    }
                }
                s.parse::<u64>().map(Label::Mpls).map_err(|_| ModelError::UnknownLabel(s.to_string()))
            }
        }
    }

    /// Returns true if and only if this is the bottom-of-stack sentinel.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Label::Bottom)
    }

    /// Returns true if and only if this is the wildcard label.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Label::Wildcard)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Bottom => write!(f, "bos"),
            Label::AnyIp => write!(f, "ip"),
            Label::Mpls(n) => write!(f, "{}", n),
            Label::Interface(n) => write!(f, "i{}", n),
            Label::Wildcard => write!(f, "null"),
        }
    }
}
