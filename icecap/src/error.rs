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

//! Module containing all error types

use crate::model::ModelError;
use crate::query::QueryParseError;
use crate::topology::GmlError;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error propagated from the network model (name resolution, pairing, ...)
    #[error("Model Error: {0}")]
    Model(#[from] ModelError),
    /// Malformed input document (network JSON, weight JSON)
    #[error("Cannot parse input: {0}")]
    InputParse(String),
    /// Malformed query string
    #[error("Query Error: {0}")]
    QueryParse(#[from] QueryParseError),
    /// Malformed GML topology
    #[error("Topology Error: {0}")]
    Gml(#[from] GmlError),
    /// The requested operation is not available in the chosen approximation
    /// mode (e.g. tracing an EXACT query).
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(&'static str),
    /// The engine selector is out of range
    #[error("Unsupported engine value: {0}")]
    SolverFailure(usize),
    /// An internal invariant was violated
    #[error("Internal error: {0}")]
    Internal(&'static str),
}
