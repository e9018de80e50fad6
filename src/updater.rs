//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use derive_new::new;
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use prefix_trie::map::PrefixMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::af::{AddressFamily, Ipv4, Ipv6};
use crate::error::Error;
use crate::interface::InterfaceMap;
use crate::ip::{IpAddrExt, IpNetworkExt, IpNetworkKind};
use crate::nexthop::{ClientId, NextHopSet};
use crate::rib::Rib;
use crate::route::{
    ForwardAction, ForwardInfo, ForwardNextHop, Route, RouteFlags,
};
use crate::table::{RouteTable, RouteTableMap};
use crate::{InterfaceId, RouterId};

// Router holding the always-programmed default routes.
pub const DEFAULT_VRF: RouterId = 0;

// A route contribution as received from a control-plane client.
#[derive(Clone, Debug, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct UnicastRoute {
    pub prefix: IpNetwork,
    pub nexthops: NextHopSet,
}

// Transaction building the next snapshot from a published one.
//
// Input operations accumulate into private per-router copies of the
// affected tables; untouched routers are shared with the input snapshot.
// `update_done` runs the resolution pass and publishes the result, or
// reports that nothing changed. Dropping an updater without calling
// `update_done` leaves the input snapshot untouched.
pub struct RouteUpdater {
    orig: Arc<RouteTableMap>,
    tables: BTreeMap<RouterId, WorkTable>,
    alpm: bool,
}

// Mutable copy of one router's tables while an update is being built.
struct WorkTable {
    id: RouterId,
    v4: PrefixMap<Ipv4Network, Route<Ipv4>>,
    v6: PrefixMap<Ipv6Network, Route<Ipv6>>,
}

// Key of a route of either family within one `WorkTable`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RouteKey {
    V4(Ipv4Network),
    V6(Ipv6Network),
}

// What a route contributes to its own resolution.
enum Contribution {
    // Client-less DROP/TO_CPU route.
    Action(ForwardAction),
    // Connected route, forwarding information fixed at derivation.
    Connected,
    // Best client next-hop set.
    Nexthops(NextHopSet),
    // Nothing to resolve with.
    None,
}

// What a resolved route offers to the routes pointing at it.
enum Resolution {
    // DROP/TO_CPU to be inherited.
    Action(ForwardAction),
    // Directly reachable subnet on the given interface.
    Connected(InterfaceId),
    // Egress set of an interior resolved route.
    Egress(BTreeSet<ForwardNextHop>),
}

// ===== impl RouteUpdater =====

impl RouteUpdater {
    pub fn new(tables: &Arc<RouteTableMap>) -> RouteUpdater {
        RouteUpdater {
            orig: tables.clone(),
            tables: Default::default(),
            alpm: false,
        }
    }

    // Enables the default-route discipline required by ALPM-style hardware:
    // the published snapshot always carries IPv4 and IPv6 default routes in
    // the default VRF, synthesizing DROP routes when absent.
    pub fn set_alpm(&mut self, alpm: bool) {
        self.alpm = alpm;
    }

    // Sets the contribution of `client` for the given prefix.
    pub fn add_route(
        &mut self,
        router_id: RouterId,
        prefix: IpNetwork,
        client: ClientId,
        nexthops: NextHopSet,
    ) -> Result<(), Error> {
        if nexthops.is_empty() {
            return Err(Error::EmptyNextHops(client));
        }
        let table = self.work_table(router_id);
        match prefix {
            IpNetwork::V4(prefix) => {
                get_or_create(&mut table.v4, prefix).update(client, nexthops)
            }
            IpNetwork::V6(prefix) => {
                get_or_create(&mut table.v6, prefix).update(client, nexthops)
            }
        }
    }

    // Registers a client-less DROP/TO_CPU route for the given prefix.
    pub fn add_route_action(
        &mut self,
        router_id: RouterId,
        prefix: IpNetwork,
        action: ForwardAction,
    ) -> Result<(), Error> {
        let table = self.work_table(router_id);
        match prefix {
            IpNetwork::V4(prefix) => {
                get_or_create(&mut table.v4, prefix).update_action(action)
            }
            IpNetwork::V6(prefix) => {
                get_or_create(&mut table.v6, prefix).update_action(action)
            }
        }
        Ok(())
    }

    // Registers the connected route derived from one interface address. The
    // unmasked address becomes the egress address of the route.
    pub fn add_interface_route(
        &mut self,
        router_id: RouterId,
        intf: InterfaceId,
        addr: IpNetwork,
    ) -> Result<(), Error> {
        let table = self.work_table(router_id);
        match addr {
            IpNetwork::V4(addr) => get_or_create(&mut table.v4, addr)
                .set_connected(intf, IpAddr::V4(addr.ip())),
            IpNetwork::V6(addr) => get_or_create(&mut table.v6, addr)
                .set_connected(intf, IpAddr::V6(addr.ip())),
        }
        Ok(())
    }

    // Reconciles the derived routes against the given interface set: after
    // this call the connected routes and the per-router fe80::/64 TO_CPU
    // routes correspond exactly to the interfaces provided. Fails without
    // touching anything when two interfaces of one router claim the same
    // prefix.
    pub fn add_interface_and_link_local_routes(
        &mut self,
        interfaces: &InterfaceMap,
    ) -> Result<(), Error> {
        type Connected = BTreeMap<IpNetwork, (InterfaceId, IpNetwork)>;
        let mut connected: BTreeMap<RouterId, Connected> = BTreeMap::new();

        for iface in interfaces.iter() {
            for addr in &iface.addresses {
                if addr.ip().is_link_local() {
                    continue;
                }
                let prefix = addr.apply_mask();
                match connected
                    .entry(iface.router_id)
                    .or_default()
                    .entry(prefix)
                {
                    btree_map::Entry::Occupied(mut o) => {
                        if o.get().0 != iface.id {
                            return Err(Error::PrefixConflict(
                                iface.router_id,
                                prefix,
                            ));
                        }
                        // Same interface, same prefix: the last address
                        // wins.
                        o.insert((iface.id, *addr));
                    }
                    btree_map::Entry::Vacant(v) => {
                        v.insert((iface.id, *addr));
                    }
                }
            }
        }

        // Reconcile every router that has or had derived routes.
        let router_ids: BTreeSet<RouterId> = self
            .orig
            .iter()
            .map(|(router_id, _)| *router_id)
            .chain(self.tables.keys().copied())
            .chain(connected.keys().copied())
            .collect();
        for router_id in router_ids {
            let desired = connected.get(&router_id);
            let table = self.work_table(router_id);

            sweep_connected(&mut table.v4, desired);
            sweep_connected(&mut table.v6, desired);

            match desired {
                Some(desired) => {
                    for (intf, addr) in desired.values() {
                        match addr {
                            IpNetwork::V4(addr) => {
                                get_or_create(&mut table.v4, *addr)
                                    .set_connected(
                                        *intf,
                                        IpAddr::V4(addr.ip()),
                                    )
                            }
                            IpNetwork::V6(addr) => {
                                get_or_create(&mut table.v6, *addr)
                                    .set_connected(
                                        *intf,
                                        IpAddr::V6(addr.ip()),
                                    )
                            }
                        }
                    }
                    get_or_create(&mut table.v6, link_local_prefix())
                        .update_action(ForwardAction::ToCpu);
                }
                None => {
                    // The router lost all its interfaces; retract the
                    // derived link-local route as well.
                    let prefix = link_local_prefix();
                    if let Some(route) = table.v6.get(&prefix) {
                        if !route.is_with_nexthops() {
                            table.v6.remove(&prefix);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // Removes the contribution of `client` for the given prefix.
    pub fn del_nexthops_for_client(
        &mut self,
        router_id: RouterId,
        prefix: IpNetwork,
        client: ClientId,
    ) -> Result<(), Error> {
        let table = self.work_table_existing(router_id)?;
        match prefix {
            IpNetwork::V4(prefix) => {
                if let Some(route) = table.v4.get_mut(&prefix.apply_mask()) {
                    route.delete_for_client(client);
                }
            }
            IpNetwork::V6(prefix) => {
                if let Some(route) = table.v6.get_mut(&prefix.apply_mask()) {
                    route.delete_for_client(client);
                }
            }
        }
        Ok(())
    }

    // Removes a route that carries no client next-hops (DROP/TO_CPU or
    // similar). Fails if the route still has client contributions.
    pub fn del_route_with_no_nexthops(
        &mut self,
        router_id: RouterId,
        prefix: IpNetwork,
    ) -> Result<(), Error> {
        let table = self.work_table_existing(router_id)?;
        match prefix {
            IpNetwork::V4(prefix) => {
                del_route_no_nexthops(&mut table.v4, router_id, prefix)
            }
            IpNetwork::V6(prefix) => {
                del_route_no_nexthops(&mut table.v6, router_id, prefix)
            }
        }
    }

    // Removes the derived fe80::/64 route of the given router.
    pub fn del_link_local_routes(
        &mut self,
        router_id: RouterId,
    ) -> Result<(), Error> {
        let table = self.work_table_existing(router_id)?;
        table.v6.remove(&link_local_prefix());
        Ok(())
    }

    // Atomically replaces the complete contribution of `client` in the
    // given router with the provided routes.
    pub fn sync_fib(
        &mut self,
        router_id: RouterId,
        client: ClientId,
        routes: &[UnicastRoute],
    ) -> Result<(), Error> {
        if routes.iter().any(|route| route.nexthops.is_empty()) {
            return Err(Error::EmptyNextHops(client));
        }
        let table = self.work_table(router_id);
        delete_for_client_all(&mut table.v4, client);
        delete_for_client_all(&mut table.v6, client);
        for route in routes {
            self.add_route(
                router_id,
                route.prefix,
                client,
                route.nexthops.clone(),
            )?;
        }
        Ok(())
    }

    // Runs the resolution pass over every touched router and publishes the
    // resulting snapshot. Returns `None` when the outcome is identical to
    // the input snapshot.
    pub fn update_done(mut self) -> Option<Arc<RouteTableMap>> {
        if self.alpm {
            self.ensure_default_routes();
        }

        for table in self.tables.values_mut() {
            table.prune();
            table.resolve();
        }

        let router_ids: BTreeSet<RouterId> = self
            .orig
            .iter()
            .map(|(router_id, _)| *router_id)
            .chain(self.tables.keys().copied())
            .collect();
        let mut tables = BTreeMap::new();
        let mut changed = false;
        for router_id in router_ids {
            let old = self.orig.get_route_table(router_id);
            match self.tables.get(&router_id) {
                Some(work) => {
                    let (table, table_changed) = work.publish(old);
                    changed |= table_changed;
                    if let Some(table) = table {
                        tables.insert(router_id, table);
                    }
                }
                None => {
                    if let Some(old) = old {
                        tables.insert(router_id, old.clone());
                    }
                }
            }
        }

        if !changed {
            return None;
        }
        Some(Arc::new(RouteTableMap::from_parts(
            tables,
            self.orig.generation() + 1,
        )))
    }

    fn ensure_default_routes(&mut self) {
        let table = self.work_table(DEFAULT_VRF);
        let prefix = Ipv4Network::default_route();
        if table.v4.get(&prefix).is_none() {
            debug!(%prefix, "synthesizing default drop route");
            get_or_create(&mut table.v4, prefix)
                .update_action(ForwardAction::Drop);
        }
        let prefix = Ipv6Network::default_route();
        if table.v6.get(&prefix).is_none() {
            debug!(%prefix, "synthesizing default drop route");
            get_or_create(&mut table.v6, prefix)
                .update_action(ForwardAction::Drop);
        }
    }

    // Returns the work copy for the given router, creating it on demand.
    fn work_table(&mut self, router_id: RouterId) -> &mut WorkTable {
        let orig = &self.orig;
        self.tables.entry(router_id).or_insert_with(|| {
            WorkTable::from_origin(router_id, orig.get_route_table(router_id))
        })
    }

    // Like `work_table`, but fails for routers absent from both the work
    // set and the input snapshot.
    fn work_table_existing(
        &mut self,
        router_id: RouterId,
    ) -> Result<&mut WorkTable, Error> {
        if !self.tables.contains_key(&router_id)
            && self.orig.get_route_table(router_id).is_none()
        {
            return Err(Error::UnknownRouter(router_id));
        }
        Ok(self.work_table(router_id))
    }
}

// ===== impl WorkTable =====

impl WorkTable {
    fn from_origin(
        id: RouterId,
        origin: Option<&Arc<RouteTable>>,
    ) -> WorkTable {
        let mut v4 = PrefixMap::default();
        let mut v6 = PrefixMap::default();
        if let Some(table) = origin {
            for (prefix, route) in table.rib_v4().iter() {
                v4.insert(*prefix, (**route).clone());
            }
            for (prefix, route) in table.rib_v6().iter() {
                v6.insert(*prefix, (**route).clone());
            }
        }
        WorkTable { id, v4, v6 }
    }

    // Drops routes left without client contributions, action override or
    // connected derivation.
    fn prune(&mut self) {
        prune_rib(&mut self.v4);
        prune_rib(&mut self.v6);
    }

    // Recursively resolves every route of the table.
    fn resolve(&mut self) {
        for (_, route) in self.v4.iter_mut() {
            route.prepare_resolve();
        }
        for (_, route) in self.v6.iter_mut() {
            route.prepare_resolve();
        }
        let keys: Vec<RouteKey> = self
            .v4
            .keys()
            .map(|prefix| RouteKey::V4(*prefix))
            .chain(self.v6.keys().map(|prefix| RouteKey::V6(*prefix)))
            .collect();
        for key in keys {
            self.resolve_route(key);
        }
    }

    // Depth-first resolution of one route.
    //
    // Cycles in the next-hop graph are detected by re-entering a route that
    // is still being processed; every route on such a cycle ends up
    // unresolvable. The outcome depends only on the graph, not on the
    // iteration order.
    fn resolve_route(&mut self, key: RouteKey) {
        let Some(flags) = self.flags(key) else {
            return;
        };
        if flags.contains(RouteFlags::RESOLVED)
            || flags.contains(RouteFlags::UNRESOLVABLE)
        {
            return;
        }
        if flags.contains(RouteFlags::PROCESSING) {
            debug!(router_id = self.id, ?key, "nexthop resolution loop");
            self.set_unresolvable(key);
            return;
        }
        self.set_processing(key);

        match self.contribution(key) {
            Contribution::Action(action) => {
                self.set_resolved(key, ForwardInfo::from_action(action));
            }
            Contribution::Connected => {
                self.set_resolved_as_is(key);
            }
            Contribution::None => {
                self.set_unresolvable(key);
            }
            Contribution::Nexthops(best) => {
                let mut egress = BTreeSet::new();
                let mut inherited = None;
                for nexthop in best {
                    let Some(lkey) = self.longest_match(nexthop.addr())
                    else {
                        debug!(
                            addr = %nexthop.addr(),
                            "nexthop has no covering route"
                        );
                        continue;
                    };
                    self.resolve_route(lkey);
                    match self.resolution(lkey) {
                        Some(Resolution::Action(action)) => {
                            // The first DROP/TO_CPU ancestor wins.
                            inherited = Some(action);
                            break;
                        }
                        Some(Resolution::Connected(intf)) => {
                            egress.insert(ForwardNextHop::new(
                                intf,
                                nexthop.addr(),
                            ));
                        }
                        Some(Resolution::Egress(nexthops)) => {
                            egress.extend(nexthops);
                        }
                        None => (),
                    }
                }
                if let Some(action) = inherited {
                    self.set_resolved(key, ForwardInfo::from_action(action));
                } else if !egress.is_empty() {
                    self.set_resolved(key, ForwardInfo::from_nexthops(egress));
                } else {
                    self.set_unresolvable(key);
                }
            }
        }
    }

    fn flags(&self, key: RouteKey) -> Option<RouteFlags> {
        match key {
            RouteKey::V4(prefix) => {
                self.v4.get(&prefix).map(|route| route.flags())
            }
            RouteKey::V6(prefix) => {
                self.v6.get(&prefix).map(|route| route.flags())
            }
        }
    }

    fn contribution(&self, key: RouteKey) -> Contribution {
        match key {
            RouteKey::V4(prefix) => match self.v4.get(&prefix) {
                Some(route) => route_contribution(route),
                None => Contribution::None,
            },
            RouteKey::V6(prefix) => match self.v6.get(&prefix) {
                Some(route) => route_contribution(route),
                None => Contribution::None,
            },
        }
    }

    fn resolution(&self, key: RouteKey) -> Option<Resolution> {
        match key {
            RouteKey::V4(prefix) => {
                self.v4.get(&prefix).and_then(route_resolution)
            }
            RouteKey::V6(prefix) => {
                self.v6.get(&prefix).and_then(route_resolution)
            }
        }
    }

    fn longest_match(&self, addr: IpAddr) -> Option<RouteKey> {
        match addr {
            IpAddr::V4(addr) => self
                .v4
                .get_lpm(&Ipv4Network::host(addr))
                .map(|(prefix, _)| RouteKey::V4(*prefix)),
            IpAddr::V6(addr) => self
                .v6
                .get_lpm(&Ipv6Network::host(addr))
                .map(|(prefix, _)| RouteKey::V6(*prefix)),
        }
    }

    fn set_processing(&mut self, key: RouteKey) {
        match key {
            RouteKey::V4(prefix) => {
                if let Some(route) = self.v4.get_mut(&prefix) {
                    route.set_processing();
                }
            }
            RouteKey::V6(prefix) => {
                if let Some(route) = self.v6.get_mut(&prefix) {
                    route.set_processing();
                }
            }
        }
    }

    fn set_resolved(&mut self, key: RouteKey, fwd: ForwardInfo) {
        match key {
            RouteKey::V4(prefix) => {
                if let Some(route) = self.v4.get_mut(&prefix) {
                    route.set_resolved(fwd);
                }
            }
            RouteKey::V6(prefix) => {
                if let Some(route) = self.v6.get_mut(&prefix) {
                    route.set_resolved(fwd);
                }
            }
        }
    }

    fn set_resolved_as_is(&mut self, key: RouteKey) {
        match key {
            RouteKey::V4(prefix) => {
                if let Some(route) = self.v4.get_mut(&prefix) {
                    route.set_resolved_as_is();
                }
            }
            RouteKey::V6(prefix) => {
                if let Some(route) = self.v6.get_mut(&prefix) {
                    route.set_resolved_as_is();
                }
            }
        }
    }

    fn set_unresolvable(&mut self, key: RouteKey) {
        match key {
            RouteKey::V4(prefix) => {
                if let Some(route) = self.v4.get_mut(&prefix) {
                    route.set_unresolvable();
                }
            }
            RouteKey::V6(prefix) => {
                if let Some(route) = self.v6.get_mut(&prefix) {
                    route.set_unresolvable();
                }
            }
        }
    }

    // Builds the published table, reusing the input snapshot's routes and
    // ribs wherever the content is unchanged. Routes keep their generation
    // when unchanged and increment it when modified; the table generation
    // follows the same rule. An empty table is dropped from the snapshot.
    fn publish(
        &self,
        old: Option<&Arc<RouteTable>>,
    ) -> (Option<Arc<RouteTable>>, bool) {
        if self.v4.is_empty() && self.v6.is_empty() {
            return (None, old.is_some());
        }

        let (rib_v4, changed_v4) =
            publish_rib(old.map(|table| table.rib_v4().as_ref()), &self.v4);
        let (rib_v6, changed_v6) =
            publish_rib(old.map(|table| table.rib_v6().as_ref()), &self.v6);

        if !changed_v4 && !changed_v6 {
            if let Some(old) = old {
                return (Some(old.clone()), false);
            }
        }

        let rib_v4 = match (changed_v4, old) {
            (false, Some(old)) => old.rib_v4().clone(),
            _ => Arc::new(rib_v4),
        };
        let rib_v6 = match (changed_v6, old) {
            (false, Some(old)) => old.rib_v6().clone(),
            _ => Arc::new(rib_v6),
        };
        let generation = old.map_or(0, |table| table.generation() + 1);
        let table =
            RouteTable::from_parts(self.id, rib_v4, rib_v6, generation);
        (Some(Arc::new(table)), true)
    }
}

// ===== global functions =====

fn get_or_create<A: AddressFamily>(
    rib: &mut PrefixMap<A::IpNetwork, Route<A>>,
    prefix: A::IpNetwork,
) -> &mut Route<A> {
    let prefix = prefix.apply_mask();
    if rib.get(&prefix).is_none() {
        rib.insert(prefix, Route::new(prefix));
    }
    rib.get_mut(&prefix).unwrap()
}

fn delete_for_client_all<A: AddressFamily>(
    rib: &mut PrefixMap<A::IpNetwork, Route<A>>,
    client: ClientId,
) {
    for (_, route) in rib.iter_mut() {
        route.delete_for_client(client);
    }
}

fn del_route_no_nexthops<A: AddressFamily>(
    rib: &mut PrefixMap<A::IpNetwork, Route<A>>,
    router_id: RouterId,
    prefix: A::IpNetwork,
) -> Result<(), Error> {
    let prefix = prefix.apply_mask();
    let Some(route) = rib.get(&prefix) else {
        return Err(Error::RouteNotFound(router_id, prefix.into()));
    };
    if route.is_with_nexthops() {
        return Err(Error::RouteStillHasNextHops(router_id, prefix.into()));
    }
    rib.remove(&prefix);
    Ok(())
}

// Removes connected routes that the interface set no longer implies. A
// route that also carries client contributions only loses its connected
// derivation.
fn sweep_connected<A: AddressFamily>(
    rib: &mut PrefixMap<A::IpNetwork, Route<A>>,
    desired: Option<&BTreeMap<IpNetwork, (InterfaceId, IpNetwork)>>,
) {
    let stale: Vec<A::IpNetwork> = rib
        .iter()
        .filter(|(prefix, route)| {
            route.is_connected()
                && !desired
                    .is_some_and(|d| d.contains_key(&(**prefix).into()))
        })
        .map(|(prefix, _)| *prefix)
        .collect();
    for prefix in stale {
        let Some(route) = rib.get_mut(&prefix) else {
            continue;
        };
        if route.is_with_nexthops() {
            route.clear_connected();
        } else {
            rib.remove(&prefix);
        }
    }
}

fn prune_rib<A: AddressFamily>(rib: &mut PrefixMap<A::IpNetwork, Route<A>>) {
    let stale: Vec<A::IpNetwork> = rib
        .iter()
        .filter(|(_, route)| {
            !route.is_with_nexthops()
                && route.action_override().is_none()
                && !route.is_connected()
        })
        .map(|(prefix, _)| *prefix)
        .collect();
    for prefix in stale {
        rib.remove(&prefix);
    }
}

fn route_contribution<A: AddressFamily>(route: &Route<A>) -> Contribution {
    if let Some(action) = route.action_override() {
        Contribution::Action(action)
    } else if route.is_connected() {
        Contribution::Connected
    } else {
        match route.best_nexthop_list() {
            Ok(nexthops) => Contribution::Nexthops(nexthops.clone()),
            Err(_) => Contribution::None,
        }
    }
}

fn route_resolution<A: AddressFamily>(
    route: &Route<A>,
) -> Option<Resolution> {
    if !route.is_resolved() {
        return None;
    }
    let fwd = route.forward_info();
    match fwd.action() {
        ForwardAction::Drop | ForwardAction::ToCpu => {
            Some(Resolution::Action(fwd.action()))
        }
        ForwardAction::NextHops if route.is_connected() => fwd
            .nexthops()
            .iter()
            .next()
            .map(|nexthop| Resolution::Connected(nexthop.intf)),
        ForwardAction::NextHops => {
            Some(Resolution::Egress(fwd.nexthops().clone()))
        }
    }
}

fn publish_rib<A: AddressFamily>(
    old: Option<&Rib<A>>,
    work: &PrefixMap<A::IpNetwork, Route<A>>,
) -> (Rib<A>, bool) {
    let mut rib = Rib::default();
    let mut changed = false;
    let mut carried = 0usize;
    for (prefix, route) in work.iter() {
        let route = match old.and_then(|old| old.exact_match(*prefix)) {
            Some(old_route) if old_route.same_content(route) => {
                carried += 1;
                old_route.clone()
            }
            Some(old_route) => {
                changed = true;
                carried += 1;
                let mut route = route.clone();
                route.set_generation(old_route.generation() + 1);
                Arc::new(route)
            }
            None => {
                changed = true;
                let mut route = route.clone();
                route.set_generation(0);
                Arc::new(route)
            }
        };
        rib.insert(*prefix, route);
    }
    // Routes present before but absent now.
    if let Some(old) = old {
        if old.size() != carried {
            changed = true;
        }
    }
    (rib, changed)
}

// fe80::/64, punted to the CPU on every router with interfaces.
fn link_local_prefix() -> Ipv6Network {
    Ipv6Network::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 64).unwrap()
}
