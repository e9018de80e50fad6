//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::af::{AddressFamily, Ipv4, Ipv6};
use crate::rib::Rib;
use crate::route::Route;
use crate::table::{RouteTable, RouteTableMap};
use crate::RouterId;

// Structural difference between two published snapshots.
//
// The delta is an external walker over the two trees; consumers drive it
// with visitor callbacks, so several independent consumers (hardware
// programming, telemetry) can process the same pair of snapshots.
pub struct RouteDelta {
    old: Arc<RouteTableMap>,
    new: Arc<RouteTableMap>,
}

// Difference of one router's tables between two snapshots.
pub struct RouteTableDelta {
    router_id: RouterId,
    old: Option<Arc<RouteTable>>,
    new: Option<Arc<RouteTable>>,
}

// Per-family route difference of one router.
pub struct RibDelta<A: AddressFamily> {
    added: Vec<Arc<Route<A>>>,
    changed: Vec<(Arc<Route<A>>, Arc<Route<A>>)>,
    removed: Vec<Arc<Route<A>>>,
}

// ===== impl RouteDelta =====

impl RouteDelta {
    pub fn new(
        old: Arc<RouteTableMap>,
        new: Arc<RouteTableMap>,
    ) -> RouteDelta {
        RouteDelta { old, new }
    }

    pub fn old(&self) -> &Arc<RouteTableMap> {
        &self.old
    }

    pub fn new_tables(&self) -> &Arc<RouteTableMap> {
        &self.new
    }

    // Returns the per-router differences, skipping routers whose tables are
    // shared between the two snapshots.
    pub fn route_tables(&self) -> Vec<RouteTableDelta> {
        let router_ids: BTreeSet<RouterId> = self
            .old
            .iter()
            .map(|(router_id, _)| *router_id)
            .chain(self.new.iter().map(|(router_id, _)| *router_id))
            .collect();
        router_ids
            .into_iter()
            .filter_map(|router_id| {
                let old = self.old.get_route_table(router_id).cloned();
                let new = self.new.get_route_table(router_id).cloned();
                if let (Some(old), Some(new)) = (&old, &new) {
                    if Arc::ptr_eq(old, new) {
                        return None;
                    }
                }
                Some(RouteTableDelta {
                    router_id,
                    old,
                    new,
                })
            })
            .collect()
    }
}

// ===== impl RouteTableDelta =====

impl RouteTableDelta {
    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    pub fn old(&self) -> Option<&Arc<RouteTable>> {
        self.old.as_ref()
    }

    pub fn new(&self) -> Option<&Arc<RouteTable>> {
        self.new.as_ref()
    }

    // Whether the router table only exists in the new snapshot.
    pub fn is_added(&self) -> bool {
        self.old.is_none() && self.new.is_some()
    }

    // Whether the router table only exists in the old snapshot.
    pub fn is_removed(&self) -> bool {
        self.old.is_some() && self.new.is_none()
    }

    // Returns the route difference of the requested address family.
    pub fn routes<A: AddressFamily>(&self) -> RibDelta<A> {
        rib_delta(
            self.old.as_ref().map(|table| A::rib(table).as_ref()),
            self.new.as_ref().map(|table| A::rib(table).as_ref()),
        )
    }

    pub fn routes_v4(&self) -> RibDelta<Ipv4> {
        self.routes::<Ipv4>()
    }

    pub fn routes_v6(&self) -> RibDelta<Ipv6> {
        self.routes::<Ipv6>()
    }
}

// ===== impl RibDelta =====

impl<A: AddressFamily> RibDelta<A> {
    pub fn added(&self) -> &[Arc<Route<A>>] {
        &self.added
    }

    pub fn changed(&self) -> &[(Arc<Route<A>>, Arc<Route<A>>)] {
        &self.changed
    }

    pub fn removed(&self) -> &[Arc<Route<A>>] {
        &self.removed
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.changed.is_empty()
            && self.removed.is_empty()
    }
}

// ===== global functions =====

// Drives the three visitor callbacks over one per-family difference.
pub fn for_each_changed<A, FC, FA, FR>(
    delta: &RibDelta<A>,
    mut on_changed: FC,
    mut on_added: FA,
    mut on_removed: FR,
) where
    A: AddressFamily,
    FC: FnMut(&Arc<Route<A>>, &Arc<Route<A>>),
    FA: FnMut(&Arc<Route<A>>),
    FR: FnMut(&Arc<Route<A>>),
{
    for (old, new) in &delta.changed {
        on_changed(old, new);
    }
    for route in &delta.added {
        on_added(route);
    }
    for route in &delta.removed {
        on_removed(route);
    }
}

fn rib_delta<A: AddressFamily>(
    old: Option<&Rib<A>>,
    new: Option<&Rib<A>>,
) -> RibDelta<A> {
    let mut delta = RibDelta {
        added: Vec::new(),
        changed: Vec::new(),
        removed: Vec::new(),
    };

    if let Some(new) = new {
        for (prefix, new_route) in new.iter() {
            match old.and_then(|old| old.exact_match(*prefix)) {
                Some(old_route) => {
                    // Routes are shared between snapshots when unchanged;
                    // a different allocation means a different route.
                    if !Arc::ptr_eq(old_route, new_route)
                        && old_route != new_route
                    {
                        delta
                            .changed
                            .push((old_route.clone(), new_route.clone()));
                    }
                }
                None => delta.added.push(new_route.clone()),
            }
        }
    }
    if let Some(old) = old {
        for (prefix, old_route) in old.iter() {
            if new.and_then(|new| new.exact_match(*prefix)).is_none() {
                delta.removed.push(old_route.clone());
            }
        }
    }

    delta.added.sort_by_key(|route| *route.prefix());
    delta.changed.sort_by_key(|(_, route)| *route.prefix());
    delta.removed.sort_by_key(|route| *route.prefix());
    delta
}
