//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::{IpNetwork, IpNetworkError, Ipv4Network, Ipv6Network};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Address Family identifier.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

// Extension methods for IpAddr.
pub trait IpAddrExt {
    // Returns the address family of this IP address.
    fn address_family(&self) -> AddressFamily;

    // Returns true if this is a link-local address (169.254.0.0/16 for IPv4,
    // fe80::/10 for IPv6).
    fn is_link_local(&self) -> bool;
}

// Extension methods for IpNetwork.
pub trait IpNetworkExt {
    // Apply mask to prefix.
    #[must_use]
    fn apply_mask(&self) -> IpNetwork;
}

pub trait IpAddrKind:
    'static
    + std::fmt::Debug
    + std::fmt::Display
    + Clone
    + Copy
    + Eq
    + std::hash::Hash
    + Ord
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + DeserializeOwned
    + Serialize
    + Into<IpAddr>
{
    fn address_family(&self) -> AddressFamily;

    fn get(addr: IpAddr) -> Option<Self>;

    fn unspecified() -> Self;
}

pub trait IpNetworkKind<I: IpAddrKind>:
    'static
    + std::fmt::Debug
    + std::fmt::Display
    + Clone
    + Copy
    + Eq
    + std::hash::Hash
    + Ord
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + DeserializeOwned
    + Serialize
    + Into<IpNetwork>
{
    const MAX_PREFIXLEN: u8;

    fn new(addr: I, prefix: u8) -> Result<Self, IpNetworkError>;

    fn address_family(&self) -> AddressFamily;

    fn get(prefix: IpNetwork) -> Option<Self>;

    // Converts the given address into a host prefix network.
    fn host(addr: I) -> Self {
        Self::new(addr, Self::MAX_PREFIXLEN).unwrap()
    }

    // Returns the default (zero-length) prefix of this address family.
    fn default_route() -> Self {
        Self::new(I::unspecified(), 0).unwrap()
    }

    fn ip(&self) -> I;

    fn prefix(&self) -> u8;

    // Apply mask to prefix.
    #[must_use]
    fn apply_mask(&self) -> Self;

    // Returns true if this is a host prefix.
    fn is_host_prefix(&self) -> bool {
        self.prefix() == Self::MAX_PREFIXLEN
    }
}

// ===== impl IpAddr =====

impl IpAddrExt for IpAddr {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn is_link_local(&self) -> bool {
        match self {
            IpAddr::V4(addr) => addr.is_link_local(),
            IpAddr::V6(addr) => addr.is_unicast_link_local(),
        }
    }
}

// ===== impl Ipv4Addr =====

impl IpAddrKind for Ipv4Addr {
    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv4
    }

    fn get(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V4(addr) => Some(addr),
            _ => None,
        }
    }

    fn unspecified() -> Self {
        Ipv4Addr::UNSPECIFIED
    }
}

// ===== impl Ipv6Addr =====

impl IpAddrKind for Ipv6Addr {
    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv6
    }

    fn get(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V6(addr) => Some(addr),
            _ => None,
        }
    }

    fn unspecified() -> Self {
        Ipv6Addr::UNSPECIFIED
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn apply_mask(&self) -> IpNetwork {
        match self {
            IpNetwork::V4(prefix) => {
                IpNetwork::V4(IpNetworkKind::apply_mask(prefix))
            }
            IpNetwork::V6(prefix) => {
                IpNetwork::V6(IpNetworkKind::apply_mask(prefix))
            }
        }
    }
}

// ===== impl Ipv4Network =====

impl IpNetworkKind<Ipv4Addr> for Ipv4Network {
    const MAX_PREFIXLEN: u8 = 32;

    fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, IpNetworkError> {
        Ipv4Network::new(addr, prefix)
    }

    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv4
    }

    fn get(prefix: IpNetwork) -> Option<Self> {
        match prefix {
            IpNetwork::V4(prefix) => Some(prefix),
            _ => None,
        }
    }

    fn ip(&self) -> Ipv4Addr {
        Ipv4Network::ip(*self)
    }

    fn prefix(&self) -> u8 {
        Ipv4Network::prefix(*self)
    }

    fn apply_mask(&self) -> Self {
        Ipv4Network::new(self.network(), Ipv4Network::prefix(*self)).unwrap()
    }
}

// ===== impl Ipv6Network =====

impl IpNetworkKind<Ipv6Addr> for Ipv6Network {
    const MAX_PREFIXLEN: u8 = 128;

    fn new(addr: Ipv6Addr, prefix: u8) -> Result<Self, IpNetworkError> {
        Ipv6Network::new(addr, prefix)
    }

    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv6
    }

    fn get(prefix: IpNetwork) -> Option<Self> {
        match prefix {
            IpNetwork::V6(prefix) => Some(prefix),
            _ => None,
        }
    }

    fn ip(&self) -> Ipv6Addr {
        Ipv6Network::ip(self)
    }

    fn prefix(&self) -> u8 {
        Ipv6Network::prefix(self)
    }

    fn apply_mask(&self) -> Self {
        Ipv6Network::new(self.network(), Ipv6Network::prefix(self)).unwrap()
    }
}
