//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use derive_new::new;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::{InterfaceId, RouterId};

// One L3 interface as seen by the configuration layer.
//
// The address list keeps configuration order; when one interface carries
// several addresses inside the same prefix, the last one is the egress
// address of the derived connected route.
#[derive(Clone, Debug, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct Interface {
    pub id: InterfaceId,
    pub router_id: RouterId,
    #[serde(skip)]
    pub mac: [u8; 6],
    pub addresses: Vec<IpNetwork>,
}

// The full interface set, keyed by interface identifier.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceMap {
    entries: BTreeMap<InterfaceId, Interface>,
}

// ===== impl InterfaceMap =====

impl InterfaceMap {
    pub fn new() -> InterfaceMap {
        Default::default()
    }

    // Adds or replaces the interface with the same identifier.
    pub fn insert(&mut self, iface: Interface) {
        self.entries.insert(iface.id, iface);
    }

    pub fn get(&self, id: InterfaceId) -> Option<&Interface> {
        self.entries.get(&id)
    }

    // Returns an iterator visiting all interfaces ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &'_ Interface> + '_ {
        self.entries.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
