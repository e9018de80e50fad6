//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ip::{AddressFamily, IpAddrExt};
use crate::InterfaceId;

// Identity of a control-plane client contributing routes.
//
// Lower numeric value means higher priority; arbitration between clients is
// a total order on these identifiers rather than arrival time.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(transparent)]
pub struct ClientId(pub u32);

// An unordered set of next-hops.
pub type NextHopSet = BTreeSet<NextHop>;

// A single next-hop: an IP address, optionally scoped to an interface.
//
// The scope is mandatory for IPv6 link-local addresses, allowed for IPv4
// link-local addresses and rejected everywhere else.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "NextHopData", into = "NextHopData")]
pub struct NextHop {
    addr: IpAddr,
    intf: Option<InterfaceId>,
}

// Wire representation of a next-hop.
#[derive(Clone, Copy, Debug)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct NextHopData {
    ip: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    if_name: Option<InterfaceId>,
}

// Per-client next-hop contributions for one route.
//
// The map is keyed by client identifier, so the first entry is always the
// winning contribution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "Vec<ClientNextHops>", into = "Vec<ClientNextHops>")]
pub struct MultiClientNextHops {
    entries: BTreeMap<ClientId, NextHopSet>,
}

// Wire representation of one client entry.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientNextHops {
    client_id: ClientId,
    nexthops: NextHopSet,
}

// ===== impl ClientId =====

impl ClientId {
    // Contributor of connected routes derived from interface addresses.
    pub const INTERFACE: ClientId = ClientId(0);
    // Contributor of derived link-local routes.
    pub const LINK_LOCAL: ClientId = ClientId(1);
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===== impl NextHop =====

impl NextHop {
    pub fn new(
        addr: IpAddr,
        intf: Option<InterfaceId>,
    ) -> Result<NextHop, Error> {
        match (addr.is_link_local(), intf) {
            // Scoping a global address is invalid.
            (false, Some(_)) => Err(Error::InvalidNextHopScope(addr)),
            // IPv6 link-local next-hops are meaningless without a scope.
            (true, None) if addr.address_family() == AddressFamily::Ipv6 => {
                Err(Error::InvalidNextHopScope(addr))
            }
            _ => Ok(NextHop { addr, intf }),
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn intf(&self) -> Option<InterfaceId> {
        self.intf
    }
}

impl From<IpAddr> for NextHop {
    // Unscoped next-hop from a plain address.
    fn from(addr: IpAddr) -> NextHop {
        NextHop { addr, intf: None }
    }
}

impl TryFrom<NextHopData> for NextHop {
    type Error = Error;

    fn try_from(data: NextHopData) -> Result<NextHop, Error> {
        NextHop::new(data.ip, data.if_name)
    }
}

impl From<NextHop> for NextHopData {
    fn from(nexthop: NextHop) -> NextHopData {
        NextHopData {
            ip: nexthop.addr,
            if_name: nexthop.intf,
        }
    }
}

// ===== impl MultiClientNextHops =====

impl MultiClientNextHops {
    // Sets the contribution of the given client, replacing any prior entry.
    pub fn update(
        &mut self,
        client: ClientId,
        nexthops: NextHopSet,
    ) -> Result<(), Error> {
        if nexthops.is_empty() {
            return Err(Error::EmptyNextHops(client));
        }
        self.entries.insert(client, nexthops);
        Ok(())
    }

    // Removes the contribution of the given client, if any.
    pub fn delete_for_client(&mut self, client: ClientId) {
        self.entries.remove(&client);
    }

    // Returns the contribution of the highest-priority client.
    pub fn best_nexthop_list(&self) -> Result<&NextHopSet, Error> {
        self.entries
            .values()
            .next()
            .ok_or(Error::NoEntries)
    }

    pub fn get(&self, client: ClientId) -> Option<&NextHopSet> {
        self.entries.get(&client)
    }

    pub fn is_same(&self, client: ClientId, nexthops: &NextHopSet) -> bool {
        self.entries.get(&client) == Some(nexthops)
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn has_nexthops_for_client(&self, client: ClientId) -> bool {
        self.entries.contains_key(&client)
    }

    // Returns an iterator over the client entries, highest priority first.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&ClientId, &NextHopSet)> + '_ {
        self.entries.iter()
    }
}

impl TryFrom<Vec<ClientNextHops>> for MultiClientNextHops {
    type Error = Error;

    fn try_from(entries: Vec<ClientNextHops>) -> Result<Self, Error> {
        let mut nexthops = MultiClientNextHops::default();
        for entry in entries {
            nexthops.update(entry.client_id, entry.nexthops)?;
        }
        Ok(nexthops)
    }
}

impl From<MultiClientNextHops> for Vec<ClientNextHops> {
    fn from(nexthops: MultiClientNextHops) -> Vec<ClientNextHops> {
        nexthops
            .entries
            .into_iter()
            .map(|(client, nexthops)| ClientNextHops::new(client, nexthops))
            .collect()
    }
}
