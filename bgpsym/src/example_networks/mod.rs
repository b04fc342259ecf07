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

//! Networks for testing

use crate::netsim::NetworkTopology;
use crate::Error;

mod simplenet;
pub use simplenet::SimpleNet;

mod deny_history_net;
pub use deny_history_net::DenyHistoryNet;

mod filter_chain_net;
pub use filter_chain_net::FilterChainNet;

mod as_path_net;
pub use as_path_net::AsPathNet;

mod community_net;
pub use community_net::CommunityNet;

mod triangle_net;
pub use triangle_net::TriangleNet;

/// Trait for easier access to example networks.
pub trait ExampleNetwork {
    /// Get the network with all route-maps configured.
    fn net() -> Result<NetworkTopology, Error>;
    /// Name of the external router from which the symbolic announcement is propagated.
    fn origin() -> &'static str;
}
