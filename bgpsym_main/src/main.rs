// BgpSym: Symbolic Verification of BGP Route-Maps
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

use bgpsym::example_networks::*;
use bgpsym::netsim::{printer, NetworkTopology};

use clap::{ArgEnum, Parser};
use log::*;
use std::error::Error;
use std::fmt;

fn main() -> Result<(), Box<dyn Error>> {
    // run clap
    let args = CommandLineArguments::parse();

    // initialize the env logger
    pretty_env_logger::init();

    match args.cmd {
        MainCommand::Show { topology } => {
            let (net, _) = get_topo(topology)?;
            println!("{}", printer::topology(&net)?);
        }
        MainCommand::Propagate { topology, origin, stop_after, unlimited } => {
            let (mut net, default_origin) = get_topo(topology)?;
            if unlimited {
                net.set_stop_after(None);
            } else if let Some(limit) = stop_after {
                net.set_stop_after(Some(limit));
            }
            let origin = origin.unwrap_or_else(|| default_origin.to_string());

            info!("Propagating a symbolic announcement in {} from {}", topology, origin);
            let result = net.propagate_announcement(&origin)?;
            info!(
                "{} announcement(s) reached the external routers",
                result.values().map(|anns| anns.len()).sum::<usize>()
            );
            println!("{}", printer::propagation_result(&origin, &result));
        }
    }

    Ok(())
}

fn get_topo(topology: Topology) -> Result<(NetworkTopology, &'static str), Box<dyn Error>> {
    Ok(match topology {
        Topology::SimpleNet => (SimpleNet::net()?, SimpleNet::origin()),
        Topology::DenyHistoryNet => (DenyHistoryNet::net()?, DenyHistoryNet::origin()),
        Topology::FilterChainNet => (FilterChainNet::net()?, FilterChainNet::origin()),
        Topology::AsPathNet => (AsPathNet::net()?, AsPathNet::origin()),
        Topology::CommunityNet => (CommunityNet::net()?, CommunityNet::origin()),
        Topology::TriangleNet => (TriangleNet::net()?, TriangleNet::origin()),
    })
}

#[derive(Parser, Debug)]
#[clap(name = "BgpSym (Binary)", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Main Command
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Parser, Debug)]
enum MainCommand {
    /// Print the routers, peerings and route-maps of a network
    #[clap(name = "show")]
    Show {
        /// Network to print
        #[clap(arg_enum)]
        topology: Topology,
    },
    /// Propagate a symbolic announcement and print what every external router receives
    #[clap(name = "propagate")]
    Propagate {
        /// Network in which the announcement is propagated
        #[clap(arg_enum)]
        topology: Topology,
        /// Name of the external router originating the announcement. If omitted, the default
        /// origin of the network is used.
        #[clap(short = 'o', long)]
        origin: Option<String>,
        /// Maximum number of propagation steps
        #[clap(short = 's', long)]
        stop_after: Option<usize>,
        /// Do not limit the number of propagation steps
        #[clap(short = 'u', long, conflicts_with = "stop_after")]
        unlimited: bool,
    },
}

#[derive(ArgEnum, Debug, Clone, Copy)]
enum Topology {
    SimpleNet,
    DenyHistoryNet,
    FilterChainNet,
    AsPathNet,
    CommunityNet,
    TriangleNet,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::SimpleNet => write!(f, "SimpleNet"),
            Topology::DenyHistoryNet => write!(f, "DenyHistoryNet"),
            Topology::FilterChainNet => write!(f, "FilterChainNet"),
            Topology::AsPathNet => write!(f, "AsPathNet"),
            Topology::CommunityNet => write!(f, "CommunityNet"),
            Topology::TriangleNet => write!(f, "TriangleNet"),
        }
    }
}
