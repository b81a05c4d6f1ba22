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

use clap::Parser;
use icecap::model::builder::network_from_str;
use icecap::model::Network;
use icecap::query::{parse_queries, NetworkWeight, Query};
use icecap::topology::network_from_gml_file;
use icecap::utils::JsonStream;
use icecap::verifier::Verifier;
use log::*;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::process::exit;

/// Verify reachability queries over MPLS networks under link failures.
#[derive(Parser, Debug)]
#[command(name = "icecap", version, about)]
struct Args {
    /// JSON network file
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Topology Zoo GML file (generates a network without routing tables)
    #[arg(long)]
    gml: Option<PathBuf>,

    /// Verification engine: 1 = Post*, 2 = Pre*
    #[arg(long, default_value_t = 1)]
    engine: usize,

    /// Reduction level applied to the PDA before solving (0 disables)
    #[arg(long, default_value_t = 0)]
    reduction: usize,

    /// Weight expression file for shortest-trace search
    #[arg(long)]
    weight: Option<PathBuf>,

    /// Do not include traces in the output
    #[arg(long)]
    no_trace: bool,

    /// Do not include timing information in the output
    #[arg(long)]
    no_timing: bool,

    /// Queries, given directly or as files containing one query per line
    queries: Vec<String>,
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let network = load_network(&args)?;
    info!(
        "loaded network \"{}\" with {} routers",
        network.name(),
        network.routers().len()
    );

    let weight = match args.weight.as_ref() {
        Some(path) => Some(NetworkWeight::parse_str(&read_to_string(path)?)?),
        None => None,
    };

    let mut queries: Vec<(String, Query)> = Vec::new();
    for arg in args.queries.iter() {
        if Path::new(arg).is_file() {
            queries.extend(parse_queries(&network, &read_to_string(arg)?)?);
        } else {
            queries.extend(parse_queries(&network, arg)?);
        }
    }
    if queries.is_empty() {
        return Err("no queries given".into());
    }

    let verifier = Verifier::new(args.engine, args.reduction)
        .print_trace(!args.no_trace)
        .print_timing(!args.no_timing);

    let stdout = std::io::stdout();
    let mut output = JsonStream::new(stdout.lock());
    verifier.run(&network, &queries, weight.as_ref(), &mut output)?;
    output.close()?;
    Ok(())
}

fn load_network(args: &Args) -> Result<Network, Box<dyn std::error::Error>> {
    match (args.input.as_ref(), args.gml.as_ref()) {
        (Some(_), Some(_)) => Err("--input cannot be used together with --gml".into()),
        (Some(input), None) => Ok(network_from_str(&read_to_string(input)?)?),
        (None, Some(gml)) => {
            Ok(network_from_gml_file(gml.to_str().ok_or("invalid --gml path")?)?)
        }
        (None, None) => Err("either --input or --gml must be given".into()),
    }
}
