//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;

use enum_as_inner::EnumAsInner;

use crate::af::{AddressFamily, Ipv4, Ipv6};
use crate::error::Error;
use crate::rib::Rib;
use crate::route::Route;
use crate::RouterId;

// The pair of per-family ribs published under one router.
#[derive(Debug)]
pub struct RouteTable {
    id: RouterId,
    rib_v4: Arc<Rib<Ipv4>>,
    rib_v6: Arc<Rib<Ipv6>>,
    generation: u64,
}

// Top-level snapshot: the route tables of every router.
//
// A snapshot is immutable once published; updaters and `revert_new_route_entry`
// produce new snapshots that share unmodified subtrees with their input.
#[derive(Debug, Default)]
pub struct RouteTableMap {
    tables: BTreeMap<RouterId, Arc<RouteTable>>,
    generation: u64,
}

// A published route of either address family.
#[derive(Clone, Debug, EnumAsInner)]
pub enum RouteEntry {
    V4(Arc<Route<Ipv4>>),
    V6(Arc<Route<Ipv6>>),
}

// ===== impl RouteTable =====

impl RouteTable {
    pub fn id(&self) -> RouterId {
        self.id
    }

    pub fn rib_v4(&self) -> &Arc<Rib<Ipv4>> {
        &self.rib_v4
    }

    pub fn rib_v6(&self) -> &Arc<Rib<Ipv6>> {
        &self.rib_v6
    }

    // Returns the rib of the requested address family.
    pub fn rib<A: AddressFamily>(&self) -> &Arc<Rib<A>> {
        A::rib(self)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.rib_v4.size() == 0 && self.rib_v6.size() == 0
    }

    // Returns an iterator visiting all routes of the table, IPv4 first.
    pub fn iter_routes(&self) -> impl Iterator<Item = RouteEntry> + '_ {
        self.rib_v4
            .iter()
            .map(|(_, route)| RouteEntry::V4(route.clone()))
            .chain(
                self.rib_v6
                    .iter()
                    .map(|(_, route)| RouteEntry::V6(route.clone())),
            )
    }

    pub(crate) fn from_parts(
        id: RouterId,
        rib_v4: Arc<Rib<Ipv4>>,
        rib_v6: Arc<Rib<Ipv6>>,
        generation: u64,
    ) -> RouteTable {
        RouteTable {
            id,
            rib_v4,
            rib_v6,
            generation,
        }
    }

    pub(crate) fn with_rib_v4(&self, rib: Arc<Rib<Ipv4>>) -> RouteTable {
        RouteTable {
            id: self.id,
            rib_v4: rib,
            rib_v6: self.rib_v6.clone(),
            generation: self.generation,
        }
    }

    pub(crate) fn with_rib_v6(&self, rib: Arc<Rib<Ipv6>>) -> RouteTable {
        RouteTable {
            id: self.id,
            rib_v4: self.rib_v4.clone(),
            rib_v6: rib,
            generation: self.generation,
        }
    }

    pub(crate) fn with_generation(self, generation: u64) -> RouteTable {
        RouteTable { generation, ..self }
    }
}

// ===== impl RouteTableMap =====

impl RouteTableMap {
    pub fn new() -> RouteTableMap {
        Default::default()
    }

    // Number of route tables in the snapshot.
    pub fn size(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_route_table(
        &self,
        router_id: RouterId,
    ) -> Option<&Arc<RouteTable>> {
        self.tables.get(&router_id)
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&RouterId, &Arc<RouteTable>)> + '_ {
        self.tables.iter()
    }

    pub(crate) fn from_parts(
        tables: BTreeMap<RouterId, Arc<RouteTable>>,
        generation: u64,
    ) -> RouteTableMap {
        RouteTableMap { tables, generation }
    }

    // Reinstates `old_route` (or removes the prefix when `None`) in place of
    // `new_route`, publishing a new snapshot. Used to undo a route that a
    // lower layer failed to program.
    pub fn revert_new_route_entry<A: AddressFamily>(
        router_id: RouterId,
        new_route: &Arc<Route<A>>,
        old_route: Option<Arc<Route<A>>>,
        tables: &mut Arc<RouteTableMap>,
    ) -> Result<(), Error> {
        let prefix = *new_route.prefix();
        let map_generation = tables.generation + 1;
        let table = tables
            .get_route_table(router_id)
            .ok_or(Error::UnknownRouter(router_id))?;

        let rib = A::rib(table);
        match rib.exact_match(prefix) {
            Some(current) if Arc::ptr_eq(current, new_route) => (),
            _ => {
                return Err(Error::RouteNotFound(router_id, prefix.into()));
            }
        }

        let mut new_rib = (**rib).clone();
        match old_route {
            Some(old_route) => new_rib.insert(prefix, old_route),
            None => new_rib.remove(prefix),
        }

        let generation = table.generation + 1;
        let new_table =
            A::with_rib(table, Arc::new(new_rib)).with_generation(generation);

        let mut new_tables = tables.tables.clone();
        new_tables.insert(router_id, Arc::new(new_table));
        *tables = Arc::new(RouteTableMap {
            tables: new_tables,
            generation: map_generation,
        });
        Ok(())
    }
}
