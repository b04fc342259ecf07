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

#![deny(missing_docs)]

//! # BgpSym: Symbolic Verification of BGP Route-Maps
//! This is a library for checking which BGP announcements can traverse a network of routers with
//! route-maps. Instead of testing single announcements, it propagates a *symbolic* announcement,
//! standing for all possible announcements, and reports the exact families of announcements
//! every external peer can receive.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`NetSim`](netsim)**: Symbolic announcements, route-maps and the network topology. See the
//!   main structure [`NetworkTopology`](netsim::NetworkTopology).
//!
//! - **[`Dfa`](dfa)**: Deterministic finite automata over the AS-path alphabet, used to represent
//!   sets of AS paths given by regular expressions.
//!
//! - **[`ExampleNetworks`](example_networks)**: Collection of prepared networks with route-maps,
//!   matching the typical filtering patterns (prefix lists with deny history, AS-path filters,
//!   community lists).
//!
//! ## Usage
//!
//! ```
//! use bgpsym::example_networks::*;
//! use bgpsym::netsim::printer;
//! use bgpsym::Error;
//!
//! fn main() -> Result<(), Error> {
//!     let net = SimpleNet::net()?;
//!     let result = net.propagate_announcement(SimpleNet::origin())?;
//!     println!("{}", printer::propagation_result(SimpleNet::origin(), &result));
//!     Ok(())
//! }
//! ```

// test modules
pub mod example_networks;
mod test;

pub mod dfa;
mod error;
pub mod netsim;

pub use error::Error;
