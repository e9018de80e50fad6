//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use prefix_trie::map::PrefixMap;

use crate::af::AddressFamily;
use crate::ip::IpNetworkKind;
use crate::route::Route;

// Longest-prefix-match table of published routes for one address family.
//
// Keys are normalized: network bits below the mask are cleared before any
// insertion or lookup.
#[derive(Debug)]
pub struct Rib<A: AddressFamily> {
    prefixes: PrefixMap<A::IpNetwork, Arc<Route<A>>>,
}

// ===== impl Rib =====

impl<A: AddressFamily> Rib<A> {
    pub fn size(&self) -> usize {
        self.prefixes.len()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&A::IpNetwork, &Arc<Route<A>>)> + '_ {
        self.prefixes.iter()
    }

    // Returns the route registered under exactly the given prefix.
    pub fn exact_match(&self, prefix: A::IpNetwork) -> Option<&Arc<Route<A>>> {
        self.prefixes.get(&prefix.apply_mask())
    }

    // Returns the most specific route covering the given address.
    pub fn longest_match(&self, addr: A::IpAddr) -> Option<&Arc<Route<A>>> {
        self.prefixes
            .get_lpm(&A::IpNetwork::host(addr))
            .map(|(_, route)| route)
    }

    pub(crate) fn insert(
        &mut self,
        prefix: A::IpNetwork,
        route: Arc<Route<A>>,
    ) {
        self.prefixes.insert(prefix.apply_mask(), route);
    }

    pub(crate) fn remove(&mut self, prefix: A::IpNetwork) {
        self.prefixes.remove(&prefix.apply_mask());
    }
}

impl<A: AddressFamily> Default for Rib<A> {
    fn default() -> Rib<A> {
        Rib {
            prefixes: Default::default(),
        }
    }
}

impl<A: AddressFamily> Clone for Rib<A> {
    fn clone(&self) -> Rib<A> {
        let mut prefixes = PrefixMap::default();
        for (prefix, route) in self.prefixes.iter() {
            prefixes.insert(*prefix, route.clone());
        }
        Rib { prefixes }
    }
}
