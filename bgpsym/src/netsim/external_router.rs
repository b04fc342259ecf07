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

//! # External Router
//!
//! The external router represents a BGP peer located in a different AS, not controlled by the
//! network operators. It can originate symbolic announcements, and it collects the announcements
//! exported to it.

use crate::netsim::{AsId, RouterId};

/// Struct representing an external router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRouter {
    name: String,
    router_id: RouterId,
    as_id: AsId,
}

impl ExternalRouter {
    /// Create a new external router
    pub(crate) fn new(name: String, router_id: RouterId, as_id: AsId) -> Self {
        Self { name, router_id, as_id }
    }

    /// Return the ID of the router
    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    /// Return the AS ID of the router
    pub fn as_id(&self) -> AsId {
        self.as_id
    }

    /// Return the name of the router
    pub fn name(&self) -> &str {
        &self.name
    }
}
