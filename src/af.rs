//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use ipnetwork::{Ipv4Network, Ipv6Network};

use crate::ip::{self, IpAddrKind, IpNetworkKind};
use crate::rib::Rib;
use crate::table::RouteTable;

// Address-family specific code.
pub trait AddressFamily:
    'static
    + Clone
    + Copy
    + std::fmt::Debug
    + Eq
    + PartialEq
    + Send
    + Sync
    + Sized
{
    // Address family identifier.
    const AF: ip::AddressFamily;

    // The type of IP address used by this address family.
    type IpAddr: IpAddrKind;
    // The type of IP network used by this address family.
    type IpNetwork: IpNetworkKind<Self::IpAddr> + prefix_trie::Prefix;

    // Get the rib for this address family from the provided `RouteTable`.
    fn rib(table: &RouteTable) -> &Arc<Rib<Self>>;

    // Build a copy of `table` carrying `rib` for this address family.
    fn with_rib(table: &RouteTable, rib: Arc<Rib<Self>>) -> RouteTable;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv4;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv6;

// ===== impl Ipv4 =====

impl AddressFamily for Ipv4 {
    const AF: ip::AddressFamily = ip::AddressFamily::Ipv4;

    type IpAddr = Ipv4Addr;
    type IpNetwork = Ipv4Network;

    fn rib(table: &RouteTable) -> &Arc<Rib<Self>> {
        table.rib_v4()
    }

    fn with_rib(table: &RouteTable, rib: Arc<Rib<Self>>) -> RouteTable {
        table.with_rib_v4(rib)
    }
}

// ===== impl Ipv6 =====

impl AddressFamily for Ipv6 {
    const AF: ip::AddressFamily = ip::AddressFamily::Ipv6;

    type IpAddr = Ipv6Addr;
    type IpNetwork = Ipv6Network;

    fn rib(table: &RouteTable) -> &Arc<Rib<Self>> {
        table.rib_v6()
    }

    fn with_rib(table: &RouteTable, rib: Arc<Rib<Self>>) -> RouteTable {
        table.with_rib_v6(rib)
    }
}
