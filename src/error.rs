//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use tracing::warn;

use crate::nexthop::ClientId;
use crate::RouterId;

// RIB errors.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    // Attempt to contribute an empty next-hop set.
    EmptyNextHops(ClientId),
    // Best next-hop selection on a route without any client entries.
    NoEntries,
    // Two interfaces claim the same connected prefix under one router.
    PrefixConflict(RouterId, IpNetwork),
    // Operation targeting a route that does not exist.
    RouteNotFound(RouterId, IpNetwork),
    // Route removal while client next-hops are still present.
    RouteStillHasNextHops(RouterId, IpNetwork),
    // Next-hop interface scope constraint violation.
    InvalidNextHopScope(IpAddr),
    // Operation against an unknown router.
    UnknownRouter(RouterId),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::EmptyNextHops(client) => {
                warn!(%client, "{}", self);
            }
            Error::NoEntries => {
                warn!("{}", self);
            }
            Error::PrefixConflict(router_id, prefix)
            | Error::RouteNotFound(router_id, prefix)
            | Error::RouteStillHasNextHops(router_id, prefix) => {
                warn!(%router_id, %prefix, "{}", self);
            }
            Error::InvalidNextHopScope(addr) => {
                warn!(%addr, "{}", self);
            }
            Error::UnknownRouter(router_id) => {
                warn!(%router_id, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyNextHops(..) => {
                write!(f, "empty next-hop set")
            }
            Error::NoEntries => {
                write!(f, "route has no next-hop entries")
            }
            Error::PrefixConflict(..) => {
                write!(f, "conflicting connected prefix")
            }
            Error::RouteNotFound(..) => {
                write!(f, "route not found")
            }
            Error::RouteStillHasNextHops(..) => {
                write!(f, "route still has client next-hops")
            }
            Error::InvalidNextHopScope(..) => {
                write!(f, "invalid next-hop interface scope")
            }
            Error::UnknownRouter(..) => {
                write!(f, "unknown router")
            }
        }
    }
}

impl std::error::Error for Error {}
