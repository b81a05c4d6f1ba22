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

//! # The verification driver
//!
//! For every query, the driver compiles the product PDA, reduces it, runs
//! the chosen reachability engine, and interprets the outcome according to
//! the approximation ladder: a DUAL query first runs the over-approximation
//! (conclusive on NO and on concretizable YES traces) and falls back to the
//! under-approximation otherwise.

use crate::error::Error;
use crate::model::factory::NetworkPdaFactory;
use crate::model::Network;
use crate::pda::{self, reducer};
use crate::query::{Mode, NetworkWeight, Query};
use crate::utils::{JsonStream, Stopwatch};
use log::*;
use serde_json::{json, Value};
use std::io::Write;

/// The three-valued verdict of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A witness trace exists.
    Yes,
    /// No trace exists under at most k failures.
    No,
    /// The approximations were inconclusive.
    Maybe,
}

impl Outcome {
    /// The JSON encoding: `true`, `false` or `null`.
    pub fn to_json(self) -> Value {
        match self {
            Outcome::Yes => json!(true),
            Outcome::No => json!(false),
            Outcome::Maybe => json!(null),
        }
    }
}

/// The verification driver. Construct it once and run any number of queries
/// against a network.
#[derive(Debug, Clone)]
pub struct Verifier {
    engine: usize,
    reduction: usize,
    print_trace: bool,
    print_timing: bool,
}

impl Verifier {
    /// Create a driver using the given engine (1 = `post*`, 2 = `pre*`) and
    /// reduction level.
    pub fn new(engine: usize, reduction: usize) -> Self {
        Self { engine, reduction, print_trace: true, print_timing: true }
    }

    /// Enable or disable the trace in the output.
    pub fn print_trace(mut self, enable: bool) -> Self {
        self.print_trace = enable;
        self
    }

    /// Enable or disable the timing fields in the output.
    pub fn print_timing(mut self, enable: bool) -> Self {
        self.print_timing = enable;
        self
    }

    /// Run all queries, streaming one entry `"Q<i>"` per query. A failing
    /// query produces an `error` entry but does not abort the batch.
    pub fn run<W: Write>(
        &self,
        network: &Network,
        queries: &[(String, Query)],
        weight: Option<&NetworkWeight>,
        output: &mut JsonStream<W>,
    ) -> Result<(), Error> {
        for (no, (query_string, query)) in queries.iter().enumerate() {
            let mut entry = match self.run_once(network, query, weight) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("query {} failed: {}", no + 1, e);
                    json!({ "error": e.to_string() })
                }
            };
            entry["query"] = json!(query_string);
            output
                .entry(&format!("Q{}", no + 1), &entry)
                .map_err(|e| Error::InputParse(e.to_string()))?;
        }
        Ok(())
    }

    /// Verify a single query and return its JSON result object.
    pub fn run_once(
        &self,
        network: &Network,
        query: &Query,
        weight: Option<&NetworkWeight>,
    ) -> Result<Value, Error> {
        let engine_name = match self.engine {
            1 => "Post*",
            2 => "Pre*",
            other => return Err(Error::SolverFailure(other)),
        };
        let mut output = json!({ "engine": engine_name });
        output["mode"] = json!(query.mode().to_string());

        // DUAL first runs the over-approximation, then the under-approximation
        let modes = match query.mode() {
            Mode::Dual => vec![Mode::Over, Mode::Under],
            mode => vec![mode],
        };

        let mut compilation_time = Stopwatch::new(false);
        let mut reduction_time = Stopwatch::new(false);
        let mut verification_time = Stopwatch::new(false);

        let mut query = query.clone();
        let mut result = Outcome::Maybe;
        let mut trace_json: Option<Value> = None;
        let mut trace_weight: Option<Vec<u32>> = None;

        for mode in modes {
            query.set_mode(mode);
            trace_json = None;
            trace_weight = None;

            compilation_time.start();
            let mut factory = NetworkPdaFactory::new(network, &query, weight);
            let mut pda = factory.compile()?;
            compilation_time.stop();

            reduction_time.start();
            let (states_removed, rules_removed) = reducer::reduce(&mut pda, self.reduction);
            output["reduction"] = json!([states_removed, rules_removed]);
            reduction_time.stop();

            verification_time.start();
            let (reachable, witness, weight_found) = match self.engine {
                1 => {
                    if weight.is_some() {
                        let (reachable, res) =
                            pda::post_star_shortest(&pda, query.prestack(), query.poststack());
                        match res {
                            Some((witness, w)) => (reachable, Some(witness), Some(w)),
                            None => (reachable, None, None),
                        }
                    } else {
                        let (reachable, witness) =
                            pda::post_star(&pda, query.prestack(), query.poststack());
                        (reachable, witness, None)
                    }
                }
                2 => {
                    if weight.is_some() {
                        warn!("shortest traces require the Post* engine; solving unweighted");
                    }
                    let (reachable, witness) =
                        pda::pre_star(&pda, query.prestack(), query.poststack(), true);
                    (reachable, witness, None)
                }
                _ => unreachable!("engine was checked above"),
            };
            verification_time.stop();

            if let Some(witness) = witness {
                let trace = pda::get_trace(&pda, witness);
                if query.mode() == Mode::Exact {
                    if query.failures() != 0 {
                        return Err(Error::UnsupportedMode(
                            "tracing is not implemented for EXACT queries",
                        ));
                    }
                } else if let Some(rendered) = factory.write_trace(&trace)? {
                    result = Outcome::Yes;
                    trace_json = Some(rendered);
                    trace_weight = weight_found;
                }
            }

            // with no failures the automaton is exact
            if query.failures() == 0 {
                result = if reachable { Outcome::Yes } else { Outcome::No };
            }
            if result == Outcome::Maybe && mode == Mode::Over && !reachable {
                result = Outcome::No;
            }
            if result != Outcome::Maybe {
                output["mode"] = json!(mode.to_string());
                break;
            }
            info!("mode {} was inconclusive", mode);
        }

        output["result"] = result.to_json();
        if self.print_trace && result == Outcome::Yes {
            if let Some(w) = trace_weight {
                output["trace-weight"] = json!(w);
            }
            if let Some(trace) = trace_json {
                output["trace"] = trace;
            }
        }
        if self.print_timing {
            output["compilation-time"] = json!(compilation_time.duration());
            output["reduction-time"] = json!(reduction_time.duration());
            output["verification-time"] = json!(verification_time.duration());
        }
        Ok(output)
    }
}
